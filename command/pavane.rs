//! A grounding driver: read PDDL domain and problem definitions;
//! number, expand, and normalize them; print the ground operators.

use std::env::args;
use std::fs::read_to_string;
use std::io::{stdin, Read};

use anyhow::{anyhow, bail, Context as _, Result};
use atty::Stream;

use pavane_ground::Grounder;
use pavane_syntax::{locate, Def, Lex as _, Parse as _, PddlLexer, PddlParser, Tokens};
use pavane_tracer::Trace;

fn main() -> Result<()> {
    let mut trace = Trace::none();
    let mut files = Vec::new();
    for arg in args().skip(1) {
        match arg.as_str() {
            "--trace" => trace = Trace::all(),
            _ => files.push(arg),
        }
    }
    if files.is_empty() {
        if atty::is(Stream::Stdin) && atty::is(Stream::Stdout) {
            println!("Welcome to Pavane! Please enter your domain (and optionally a problem), terminated with Ctrl-D.");
        }
        files.push(String::from("-"));
    }

    let mut domain = None;
    let mut problem = None;
    for file in &files {
        for def in parse(&read_file(file)?)? {
            match def {
                Def::Domain(d) => domain = Some(d),
                Def::Problem(p) => problem = Some(p),
            }
        }
    }
    let Some(domain) = domain else {
        bail!("no domain definition found");
    };

    let grounding = Grounder::new(trace).ground(domain, problem)?;
    for operator in &grounding.operators {
        println!("{}", grounding.format_operator(operator));
    }
    Ok(())
}

/// Lex and parse one file's worth of `define` forms.
fn parse(input: &str) -> Result<Vec<Def>> {
    let (rest, tokens) = PddlLexer::lex(input).map_err(|e| anyhow!(e.to_string()))?;
    if let Some(c) = rest.chars().next() {
        bail!("unexpected character {c:?}");
    }
    let tokens = locate(input, tokens);
    let (_, defs) =
        PddlParser::parse(Tokens::new(&tokens[..])).map_err(|e| anyhow!(e.to_string()))?;
    Ok(defs)
}

/// Read a file or standard input and return the content as a string.
fn read_file(filename: &str) -> Result<String> {
    match filename {
        "-" => {
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Reading from stdin")?;
            Ok(buffer)
        }
        filename => read_to_string(filename).with_context(|| format!("Reading {filename}")),
    }
}
