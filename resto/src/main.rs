use clap::{Command, Arg};
use std::process;


#[tokio::main]
async fn main() {
    let config_arg = Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Sets a custom config file");

    let matches = Command::new("Restaurant Query Service")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Serves filtered, paginated restaurant queries over MongoDB")
        .subcommand(
            Command::new("serve")
                .about("Run the restaurant query API")
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Ping the database and print connection details")
                .arg(config_arg),
        )
        .get_matches();

    let (command, sub_matches) = match matches.subcommand() {
        Some((name, sub_matches)) => (name, sub_matches),
        None => {
            println!("No subcommand specified. Use --help for usage information.");
            process::exit(1);
        }
    };

    let config_path = sub_matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/resto.toml");

    let result = match command {
        "serve" => resto::run_resto_api(config_path).await,
        "check" => resto::run_connection_check(config_path).await,
        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("{} failed: {}", command, e);
        process::exit(1);
    }
}
