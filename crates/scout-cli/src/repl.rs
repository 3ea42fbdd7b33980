//! Interactive session: one trigger per line, market data memoised across lines

use scout_stock::{Scout, Trigger};
use std::io::{self, BufRead, Write};

use crate::Output;

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Analyze(&'a str),
    Scan,
    Help,
    Exit,
    Unknown(&'a str),
}

fn parse(line: &str) -> Input<'_> {
    let line = line.trim().trim_start_matches('/');
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match command.to_lowercase().as_str() {
        "analyze" | "a" => Input::Analyze(rest.trim()),
        "scan" | "s" => Input::Scan,
        "help" | "h" | "?" => Input::Help,
        "exit" | "quit" | "q" => Input::Exit,
        _ => Input::Unknown(command),
    }
}

fn print_banner() {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                         stock-scout                          ║
║                                                              ║
║  Commands:                                                   ║
║    analyze <codes>  - 手動分析 (e.g. analyze 2330, 2317)      ║
║    scan             - 0050 潛力股掃描 (scan the TW-50)        ║
║    help             - 顯示說明 (help)                         ║
║    exit             - 離開 (exit)                             ║
╚══════════════════════════════════════════════════════════════╝
"
    );
}

async fn execute(scout: &Scout, output: &Output, trigger: Trigger) {
    if let Err(e) = crate::execute(scout, trigger, output).await {
        eprintln!("Error: {e:#}\n");
    }
}

pub async fn run(scout: &Scout, output: &Output) -> anyhow::Result<()> {
    print_banner();
    if !scout.commentary_enabled() {
        println!("(commentary disabled)\n");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("stock-scout> ");
        stdout.flush()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        if line.trim().is_empty() {
            continue;
        }

        match parse(&line) {
            Input::Analyze(list) => match scout.parse_tickers(list) {
                Ok(symbols) if symbols.is_empty() => eprintln!("Usage: analyze <codes>\n"),
                Ok(symbols) => execute(scout, output, Trigger::Manual(symbols)).await,
                Err(e) => eprintln!("Error: {e}\n"),
            },
            Input::Scan => execute(scout, output, Trigger::Scan).await,
            Input::Help => print_banner(),
            Input::Exit => {
                println!("Goodbye!");
                break;
            }
            Input::Unknown(command) => eprintln!("Unknown command: {command} (try help)\n"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("analyze 2330, 2317"), Input::Analyze("2330, 2317"));
        assert_eq!(parse("/analyze  2330"), Input::Analyze("2330"));
        assert_eq!(parse("ANALYZE"), Input::Analyze(""));
        assert_eq!(parse("scan"), Input::Scan);
        assert_eq!(parse("  help "), Input::Help);
        assert_eq!(parse("quit"), Input::Exit);
        assert_eq!(parse("buy 2330"), Input::Unknown("buy"));
    }
}
