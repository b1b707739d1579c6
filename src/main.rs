use ansledger::application::{
    dashboard, default_backup_filename, export_backup, import_backup, init::init,
    parse_assignments, ConfigService, ListQuery, RecordService,
};
use ansledger::cli::{format_dashboard, format_page, format_record_detail, format_record_table};
use ansledger::cli::{Cli, Commands};
use ansledger::domain::{CollectionKey, Criteria, SortOrder};
use ansledger::error::{AnsError, Result};
use ansledger::infrastructure::{FileSystemRepository, WorkspaceRepository};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    init_tracing();

    match run(cli) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

/// ANSLEDGER_LOG wins; otherwise the workspace's log_level, then "warn"
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ANSLEDGER_LOG").unwrap_or_else(|_| {
        let level = FileSystemRepository::discover()
            .and_then(|repo| repo.load_settings())
            .map(|settings| settings.log_level)
            .unwrap_or_else(|_| "warn".to_string());
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_collection(name: &str) -> Result<CollectionKey> {
    CollectionKey::from_str(name).map_err(AnsError::Config)
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { path } = &cli.command {
        return init(path);
    }

    let repo = FileSystemRepository::discover()?;
    let settings = repo.load_settings()?;
    let store = repo.open_store()?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Add { collection, fields } => {
            let collection = parse_collection(&collection)?;
            let record = RecordService::new(&store, collection).create(parse_assignments(&fields)?)?;
            println!(
                "Added {} {} (id {})",
                collection,
                record.code().unwrap_or_default(),
                record.id
            );
            Ok(())
        }
        Commands::Update {
            collection,
            id,
            fields,
        } => {
            let collection = parse_collection(&collection)?;
            let record =
                RecordService::new(&store, collection).update(&id, parse_assignments(&fields)?)?;
            println!("Updated {} {}", collection, record.id);
            Ok(())
        }
        Commands::Delete { collection, id } => {
            let collection = parse_collection(&collection)?;
            RecordService::new(&store, collection).delete(&id)?;
            println!("Deleted {} {}", collection, id);
            Ok(())
        }
        Commands::Show { collection, id } => {
            let collection = parse_collection(&collection)?;
            let record = RecordService::new(&store, collection).show(&id)?;
            print!("{}", format_record_detail(&record));
            Ok(())
        }
        Commands::List {
            collection,
            search,
            sort,
            desc,
            page,
        } => {
            let collection = parse_collection(&collection)?;
            let query = ListQuery {
                search,
                sort_by: sort,
                order: if desc { SortOrder::Desc } else { SortOrder::Asc },
                page,
                page_size: settings.page_size,
            };
            let page = RecordService::new(&store, collection).list(&query);
            println!("{}", format_page(collection, &page).trim_end());
            Ok(())
        }
        Commands::Find {
            collection,
            criteria,
        } => {
            let collection = parse_collection(&collection)?;
            let criteria: Criteria = parse_assignments(&criteria)?.into_iter().collect();
            let records = RecordService::new(&store, collection).find(&criteria);
            println!("{}", format_record_table(collection, &records).trim_end());
            Ok(())
        }
        Commands::Stats => {
            print!("{}", format_dashboard(&dashboard(&store)));
            Ok(())
        }
        Commands::Backup { output } => {
            let path = output.unwrap_or_else(|| {
                PathBuf::from(default_backup_filename(chrono::Local::now()))
            });
            export_backup(&store, &path)?;
            println!("Backup written to {}", path.display());
            Ok(())
        }
        Commands::Restore { file } => {
            let snapshot = import_backup(&store, &file)?;
            println!(
                "Restored backup from {}",
                snapshot.backup_date.as_deref().unwrap_or_default()
            );
            Ok(())
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err(AnsError::Config(
                    "Refusing to erase all data without --yes".to_string(),
                ));
            }
            if !store.clear() {
                return Err(AnsError::Persist("all keys".to_string()));
            }
            println!("All data erased");
            Ok(())
        }
        Commands::Config { key, value, list } => {
            let service = ConfigService::new(repo, &store);

            if list {
                for (k, v) in service.list()? {
                    println!("{} = {}", k, v);
                }
                Ok(())
            } else if let Some(k) = key {
                if let Some(v) = value {
                    service.set(&k, &v)?;
                    println!("Set {} = {}", k, v);
                } else {
                    println!("{}", service.get(&k)?);
                }
                Ok(())
            } else {
                println!("Usage: ansledger config [--list | <key> [<value>]]");
                println!(
                    "Valid keys: page_size, log_level, currency, date_format, tax_rate, company_name"
                );
                Ok(())
            }
        }
    }
}
