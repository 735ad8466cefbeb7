use argh::FromArgs;
use pss::env::Environment;
use pss::io_adapters::{Piped, Terminal};
use pss::{Config, Interpreter};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";

#[derive(FromArgs)]
/// An interactive shell with a handful of study-friendly builtins.
struct Args {
    #[argh(option)]
    /// file to append the command history to.
    history: Option<PathBuf>,

    #[argh(switch)]
    /// do not print the welcome screen.
    no_banner: bool,

    #[argh(option, short = 'c')]
    /// run this line and exit.
    command: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    let env = Environment::new();
    let mut config = Config::from_env(&env);
    if let Some(history) = args.history {
        config.history_path = pss::config::absolutize(&env.current_dir, history);
    }
    let mut shell = Interpreter::new(config, env);

    if let Some(line) = args.command {
        shell.execute_line(&line);
        return;
    }

    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        shell.repl(&mut Piped::new(stdin.lock()));
        return;
    }

    if !args.no_banner {
        print_welcome_screen();
    }
    match Terminal::new() {
        Ok(mut terminal) => shell.repl(&mut terminal),
        Err(e) => {
            warn!(error = %e, "line editor unavailable, reading plain input");
            shell.repl(&mut Piped::new(stdin.lock()));
        }
    }
}

fn print_welcome_screen() {
    println!();
    println!("{CYAN}***************************************{RESET}");
    println!("{CYAN}** {BOLD}{BLUE}Welcome to PSS!{RESET}{CYAN}                   **{RESET}");
    println!("{CYAN}***************************************{RESET}");
    println!();
    println!("{BOLD}Instructions:{RESET}");
    let tips = [
        ("help", "for a list of commands."),
        ("exit", "to leave the shell."),
        ("cd <dir>", "to change the directory."),
        ("remind <task> <date> <time>", "to set a reminder."),
        ("search <query> <dir>", "to search for a pattern in a directory."),
        ("run <file>", "to run a .c, .cpp or .py file."),
        ("ssh <host> [-s <name>]", "to connect to a remote machine and save it."),
        ("define <term> [definition]", "to store or look up a definition."),
        ("preview <file> [-n <lines>]", "to view the first lines of a file."),
    ];
    for (command, what) in tips {
        println!(" - {YELLOW}'{command}'{RESET} {what}");
    }
    println!();
    println!("{CYAN}Get started by typing a command! Type {RESET}'help'{CYAN} for assistance.{RESET}");
    println!("{CYAN}***************************************{RESET}");
    println!();
}
