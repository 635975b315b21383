//! Terminal rendering of the world.
//!
//! Everything here is read-only formatting. The narrative voice lives in
//! the event `Display` impls; this module handles the tabular views.

use firesong_catalog::blood::{blood_reading, heritage_label};
use firesong_sim::Sim;
use firesong_types::{AgeClass, FidelityBand};

/// Human label for a life stage.
fn age_label(class: AgeClass) -> &'static str {
    match class {
        AgeClass::Youth => "youth",
        AgeClass::Adult => "adult",
        AgeClass::Elder => "elder",
        AgeClass::Dead => "dying",
    }
}

/// Human label for a fidelity band.
fn band_label(band: FidelityBand) -> &'static str {
    match band {
        FidelityBand::Lost => "lost",
        FidelityBand::Garbled => "garbled",
        FidelityBand::Sound => "sound",
    }
}

/// The full status view: where the band is and how it is doing.
pub fn status(sim: &Sim) {
    let state = sim.state();
    let era_name = sim
        .catalog()
        .era(state.era.as_str())
        .map_or_else(|| state.era.to_string(), |e| e.name.clone());

    println!("{era_name} — {}, Year {} ({} BP)", state.season, state.year, state.years_bp);
    if state.collapsed {
        println!("The band is gone. The songs have stopped.");
        return;
    }
    println!("Food: {}   Sunlight: {:.0}%", state.food, state.sunlight * 100.0);

    println!();
    println!("The band ({}):", state.people.len());
    for p in &state.people {
        let carried = p.verses().filter(|(_, f)| *f >= 0.1).count();
        println!(
            "  {:<14} age {:>2}  {:<5}  {:<5}  {} verses",
            p.name,
            p.age,
            age_label(p.age_class()),
            heritage_label(sim.catalog().peoples(), &p.blood),
            carried
        );
        let reading = blood_reading(sim.catalog().blood(), &p.blood);
        if !reading.is_empty() {
            println!("      blood: {reading}");
        }
    }

    println!();
    if state.setlist.is_empty() {
        println!("The fire is quiet. Nothing is on the setlist.");
    } else {
        println!("Tonight's setlist:");
        for (i, v) in state.setlist.iter().enumerate() {
            let reps = state.setlist_history.get(v).copied().unwrap_or(0);
            println!(
                "  {}. {} ({} season{})",
                i + 1,
                sim.registry().name_of(v.as_str()),
                reps,
                if reps == 1 { "" } else { "s" }
            );
        }
    }

    if state.tree.height > 0 {
        println!();
        println!("The tree stands {} rings tall:", state.tree.height);
        for v in &state.tree.carved {
            println!("  carved: {}", sim.registry().name_of(v.as_str()));
        }
    }

    if !state.fragments.is_empty() {
        println!();
        println!("Fragments lie in the ash:");
        for frag in &state.fragments {
            println!("  {}", sim.registry().name_of(frag.verse.as_str()));
        }
    }

    if !state.ash_verses.is_empty() {
        println!();
        println!("Something hums in the stump:");
        for v in &state.ash_verses {
            println!("  {}", sim.registry().name_of(v.as_str()));
        }
    }

    if let Some(stranger) = &state.encounter {
        println!();
        println!("{} waits at the edge of camp.", stranger.name);
    }

    println!();
    println!("The spirits:");
    for (id, spirit) in &state.spirits {
        let name = sim
            .catalog()
            .spirits()
            .get(id)
            .map_or_else(|| id.to_string(), |def| def.name.clone());
        println!("  {:<22} relationship {:.2}  danger {:.2}", name, spirit.spirit, spirit.danger);
    }

    println!();
    bridges(sim);
}

/// The bridge list for the current era.
pub fn bridges(sim: &Sim) {
    let options = sim.bridges();
    if options.is_empty() {
        println!("No bridges lead out of this era.");
        return;
    }
    println!("Bridges:");
    for b in &options {
        let names: Vec<String> =
            b.requires.iter().map(|v| sim.registry().name_of(v.as_str())).collect();
        let mark = if b.met { "ready" } else { "not yet" };
        println!("  {} [{mark}] — needs {}", b.target_name, names.join(", "));
        println!("    {}", b.desc);
    }
}

/// Every verse the band holds, best fidelity first.
pub fn verses(sim: &Sim) {
    let state = sim.state();
    let config = sim.config();
    let mut held: Vec<(String, String, f64)> = Vec::new();
    for def in sim.registry().iter() {
        let best = state.best_fidelity(def.id.as_str());
        if best > 0.0 {
            held.push((def.id.to_string(), def.name.clone(), best));
        }
    }
    held.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(core::cmp::Ordering::Equal));

    if held.is_empty() {
        println!("The band holds no songs.");
        return;
    }
    for (id, name, best) in &held {
        let band = FidelityBand::classify(
            *best,
            config.transmission.lost_threshold,
            config.transmission.garble_threshold,
        );
        let carved = if state.is_carved(id) { "  [carved]" } else { "" };
        println!("  {name:<24} {:>3.0}%  {}{carved}", best * 100.0, band_label(band));
    }
}
