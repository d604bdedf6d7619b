//! Utility to create and activate a goal from the command line
//!
//! Usage: set_goal <user_id> <calories> <protein> <carbs> <fat> [name]

use nutrilog::config::Config;
use nutrilog::models::{Goal, GoalCreate};
use nutrilog::nutrition::Nutrition;

const USAGE: &str = "usage: set_goal <user_id> <calories> <protein> <carbs> <fat> [name]";

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize, label: &str) -> Result<T, String> {
    let raw = args.get(idx).ok_or_else(|| format!("missing {}\n{}", label, USAGE))?;
    raw.parse::<T>().map_err(|_| format!("invalid {} '{}'\n{}", label, raw, USAGE))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let user_id: i64 = parse_arg(&args, 0, "user_id")?;
    let targets = Nutrition::new(
        parse_arg(&args, 1, "calories")?,
        parse_arg(&args, 2, "protein")?,
        parse_arg(&args, 3, "carbs")?,
        parse_arg(&args, 4, "fat")?,
    );
    let name = args.get(5).cloned();

    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = nutrilog::db::Database::new(&config.database_path)?;

    // Run migrations
    database.with_conn(|conn| {
        nutrilog::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    database.with_conn(|conn| {
        let goal = Goal::create(
            conn,
            &GoalCreate {
                user_id,
                name,
                targets,
                start_date: None,
                end_date: None,
                is_active: true,
            },
        )?;
        println!("Goal set:");
        println!("  ID: {}", goal.id);
        println!("  User: {}", goal.user_id);
        println!("  Name: {}", goal.name.as_deref().unwrap_or("-"));
        println!(
            "  Targets: {} kcal, {} g protein, {} g carbs, {} g fat",
            goal.targets.calories, goal.targets.protein, goal.targets.carbs, goal.targets.fat
        );
        println!("  Created: {}", goal.created_at);
        Ok(())
    })?;

    Ok(())
}
