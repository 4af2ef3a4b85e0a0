use std::{fs, io::Read, process};

use ll1_helper::Grammar;
use serde::Serialize;

fn print_help() {
    println!("Usage: ll1-helper [actions] outputs [options] [grammar file]");
    println!("actions:");
    println!("  elf: Eliminate left recursion");
    println!("outputs:");
    println!("  prod: Productions");
    println!("  ff: First and follow sets");
    println!("  ll1: LL(1) parsing table");
    println!("  parse: Parse the string given by -i");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
    println!("  -i <string>: Whitespace-separated input for parse");
}

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

fn render<T: Serialize>(
    t: &T,
    format: &OutputFormat,
    plain: impl Fn(&T) -> String,
    latex: impl Fn(&T) -> String,
) -> Result<String, String> {
    match format {
        OutputFormat::Plain => Ok(plain(t)),
        OutputFormat::LaTeX => Ok(latex(t)),
        OutputFormat::JSON => serde_json::to_string(t).map_err(|e| e.to_string()),
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let mut actions: Vec<&str> = Vec::new();
    let mut outputs: Vec<&str> = Vec::new();
    let mut i: usize = 0;
    while i < args.len() && args[i] == "elf" {
        actions.push(args[i].as_str());
        i += 1;
    }
    while i < args.len() && ["prod", "ff", "ll1", "parse"].contains(&args[i].as_str()) {
        outputs.push(args[i].as_str());
        i += 1;
    }

    let mut output_format = OutputFormat::Plain;
    let mut parse_input: Option<&str> = None;

    while i < args.len() && ["-h", "--help", "-l", "-j", "-i"].contains(&args[i].as_str()) {
        if args[i] == "-h" || args[i] == "--help" {
            print_help();
            return Ok(());
        } else if args[i] == "-l" {
            output_format = OutputFormat::LaTeX;
        } else if args[i] == "-j" {
            output_format = OutputFormat::JSON;
        } else if args[i] == "-i" {
            i += 1;
            parse_input = Some(
                args.get(i)
                    .map(String::as_str)
                    .ok_or("-i expects an input string")?,
            );
        }
        i += 1;
    }

    if i + 1 < args.len() || outputs.is_empty() {
        print_help();
        return Ok(());
    }
    if outputs.contains(&"parse") && parse_input.is_none() {
        return Err("parse needs an input string, pass it with -i".to_string());
    }

    let input: String = if i == args.len() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        input
    } else {
        fs::read_to_string(args[i].as_str())
            .map_err(|e| format!("Failed to read {}: {}", args[i], e))?
    };

    let mut g = Grammar::parse(&input).map_err(|e| e.to_string())?;

    for action in actions {
        if action == "elf" {
            g = g.eliminate_left_recursion();
        }
    }

    let analysis = g.analyze();

    for output in outputs {
        let text = match output {
            "prod" => render(
                &g.to_production_output_vec(),
                &output_format,
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            "ff" => render(
                &analysis.to_non_terminal_output_vec(),
                &output_format,
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            "ll1" => match output_format {
                OutputFormat::JSON => {
                    serde_json::to_string(&analysis.to_output()).map_err(|e| e.to_string())?
                }
                _ => {
                    let mut text = render(
                        &analysis.table,
                        &output_format,
                        |t| t.to_plaintext(),
                        |t| t.to_latex(),
                    )?;
                    if let OutputFormat::Plain = output_format {
                        for conflict in &analysis.conflicts {
                            text.push('\n');
                            text.push_str(&conflict.to_plaintext());
                        }
                    }
                    text
                }
            },
            "parse" => {
                let result = analysis.parse(parse_input.unwrap_or_default());
                let mut text = render(
                    &result,
                    &output_format,
                    |t| t.to_plaintext(),
                    |t| t.to_latex(),
                )?;
                if let OutputFormat::Plain = output_format {
                    text.push('\n');
                    text.push_str(if result.accepted { "accepted" } else { "rejected" });
                }
                text
            }
            _ => unreachable!(),
        };
        println!("{}", text);
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<String>>();
    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
