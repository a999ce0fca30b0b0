pub mod config;
pub mod replay;
pub mod run;

use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use lj_core::EntityId;
use lj_simulation::{InteractionSystem, SimConfig, SimEventKind, Simulation, TreeSystem};

/// Load the configuration file if one was given, then apply the seed override.
fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<SimConfig, String> {
    let config = match path {
        Some(path) => SimConfig::load(path).map_err(|e| e.to_string())?,
        None => SimConfig::default(),
    };
    let config = match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Print the end-of-run report: header, optional event log, scene table.
fn print_report(sim: &Simulation, player: EntityId, label: &str, show_events: bool) {
    let clock = sim.clock();
    println!(
        "  {} '{}' {}",
        label.bold(),
        sim.world().meta.name,
        format!(
            "({} frames, {:.2}s simulated, seed={})",
            clock.frame(),
            clock.elapsed(),
            sim.config().seed
        )
        .dimmed()
    );
    println!(
        "  {} entities, {} events logged",
        sim.world().entity_count(),
        sim.events().len()
    );
    println!();

    if show_events {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let frame = format!("[frame {:>5}]", event.tick).dimmed();
            println!("  {frame} {}", colorize_event(&event.kind, &event.description));
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    }

    let events = sim.events();
    let felled = events.count_where(|k| matches!(k, SimEventKind::TreeFelled { .. }));
    let dropped = events.count_where(|k| matches!(k, SimEventKind::LogSpawned { .. }));
    let sold = events.count_where(|k| matches!(k, SimEventKind::Sold { .. }));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Stat", "Value"]);
    table.add_row(vec!["Trees felled".to_string(), felled.to_string()]);
    table.add_row(vec!["Logs dropped".to_string(), dropped.to_string()]);
    table.add_row(vec!["Logs sold".to_string(), sold.to_string()]);
    table.add_row(vec![
        "Balance".to_string(),
        sim.economy().balance().to_string(),
    ]);
    if let Some(pose) = sim.world().pose(player) {
        let p = pose.position;
        table.add_row(vec![
            "Player position".to_string(),
            format!("({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
        ]);
    }
    let carrying = sim
        .get_system::<InteractionSystem>()
        .and_then(|s| s.take_carried(player))
        .is_some();
    table.add_row(vec!["Carrying".to_string(), carrying.to_string()]);
    println!("{table}");
    println!();

    if let Some(trees) = sim.get_system::<TreeSystem>()
        && !trees.trees().is_empty()
    {
        println!("  {}", "Trees".bold().underline());
        println!();
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Tree", "State", "Health"]);
        for tree in trees.trees() {
            let name = sim
                .world()
                .get_entity(tree.entity())
                .map_or_else(|| tree.entity().to_string(), |e| e.name.clone());
            table.add_row(vec![
                name,
                format!("{:?}", tree.state()),
                format!("{}/{}", tree.health().max(0), tree.max_health()),
            ]);
        }
        println!("{table}");
        println!();
    }
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::TreeFelled { .. } => description.red().bold(),
        SimEventKind::TreeHit { .. } => description.yellow(),
        SimEventKind::LogSpawned { .. } | SimEventKind::TreeRespawned { .. } => description.green(),
        SimEventKind::PickedUp { .. } | SimEventKind::Dropped { .. } => description.cyan(),
        SimEventKind::Sold { .. } | SimEventKind::BalanceChanged { .. } => {
            description.green().bold()
        }
        SimEventKind::CameraReset { .. } => description.blue(),
        SimEventKind::ComponentDisabled { .. } => description.red(),
        SimEventKind::Custom { .. } => description.normal(),
    }
}
