use clap::Subcommand;
use hikarie_core::{BadgeRegistry, Config};
use serde_json::json;

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List badge definitions
    List {
        /// Include badges of disabled types
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: BadgesAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let registry = config.registry()?;

    match action {
        BadgesAction::List { all, json } => {
            let definitions: Vec<_> = if all {
                registry.catalogue().collect()
            } else {
                registry.all_definitions().collect()
            };

            if json {
                let value: Vec<_> = definitions
                    .iter()
                    .map(|badge| {
                        json!({
                            "badge_id": badge.id,
                            "badge_type": badge.badge_type,
                            "type_name": type_name(&registry, badge.badge_type),
                            "message": badge.message,
                            "condition": badge.condition,
                            "level": badge.level,
                            "score": badge.score,
                            "enabled": registry.is_enabled(badge.badge_type),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for badge in definitions {
                    println!(
                        "{:>5}  {:<20} Lv{} +{:<3} {} ({})",
                        badge.id,
                        type_name(&registry, badge.badge_type),
                        badge.level,
                        badge.score,
                        badge.message,
                        badge.condition
                    );
                }
            }
        }
    }
    Ok(())
}

fn type_name(registry: &BadgeRegistry, type_id: u32) -> &'static str {
    registry.badge_type(type_id).map_or("unknown", |t| t.name)
}
