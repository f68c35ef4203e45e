//! Basic demonstration of the skirmish simulation.
//!
//! Run with: cargo run --example basic_skirmish

use skirmish_sim::{SimConfig, SimEvent, SimWorld, Team};

fn main() {
    println!("=== Skirmish Simulation Demo ===\n");

    let config = SimConfig {
        grid_size: 10,
        seed: 42,
        agents_per_team: 5,
        step_interval: 0.5,
        ..Default::default()
    };
    let mut sim = SimWorld::new(config).expect("valid config");

    sim.subscribe(|event| match event {
        SimEvent::Death { agent } => println!("  >> agent {} died", agent.0),
        SimEvent::AttackImpact { attacker } => {
            println!("  >> agent {} landed a hit", attacker.0)
        }
    });

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Run until one team is wiped out (or we give up).
    println!("\nRunning simulation (0.5s per tick)...\n");
    for tick in 0..400 {
        sim.advance_step();

        if (tick + 1) % 20 == 0 {
            println!("--- Tick {} ---", sim.current_tick());
            print_snapshot(&mut sim);
        }

        if sim.living_agents(Team::Red) == 0 || sim.living_agents(Team::Blue) == 0 {
            println!("\n--- Match over at tick {} ---", sim.current_tick());
            break;
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();

    for team in ["Red", "Blue"] {
        println!("  {} team:", team);
        for agent in snapshot.agents.iter().filter(|a| a.team == team) {
            println!(
                "    Agent {}: cell=({}, {}) hp={}/{} [{}]",
                agent.id, agent.col, agent.row, agent.hp, agent.hp_max, agent.state
            );
        }
    }
}
