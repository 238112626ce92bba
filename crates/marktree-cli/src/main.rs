//! marktree: CLI tool to inspect and re-render markdown documents

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use marktree_core::{to_json, to_markdown, to_text, JsonOptions, TextOptions, Tree};

#[derive(Parser, Debug)]
#[command(name = "marktree")]
#[command(about = "Inspect and re-render markdown documents")]
#[command(version)]
#[command(after_help = "Examples:
  marktree render README.md               # Normalized markdown to stdout
  marktree render README.md -r json       # Structural JSON dump
  marktree render README.md -r text       # Prose only, for word counts
  marktree tree README.md                 # Pretty-printed document tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and render it back out
    Render {
        /// Input markdown file, or - for stdin
        source: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        renderer: Renderer,

        /// Emit JSON on one line
        #[arg(long)]
        compact: bool,

        /// Keep code blocks and inline code in text output
        #[arg(long)]
        include_code: bool,

        /// Keep punctuation in text output
        #[arg(long)]
        keep_punctuation: bool,
    },
    /// Print the document tree with line numbers
    Tree {
        /// Input markdown file, or - for stdin
        source: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Renderer {
    Markdown,
    Json,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            source,
            renderer,
            compact,
            include_code,
            keep_punctuation,
        } => {
            let tree = load_tree(&source)?;
            let rendered = match renderer {
                Renderer::Markdown => to_markdown(&tree),
                Renderer::Json => to_json(&tree, &JsonOptions { pretty: !compact }),
                Renderer::Text => to_text(
                    &tree,
                    &TextOptions {
                        ignore_code_blocks: !include_code,
                        ignore_inline_code: !include_code,
                        strip_punctuation: !keep_punctuation,
                    },
                ),
            };
            println!("{rendered}");
        }
        Command::Tree { source } => {
            let tree = load_tree(&source)?;
            print!("{}", tree.pretty());
        }
    }

    Ok(())
}

fn load_tree(source: &Path) -> Result<Tree> {
    let content = if source == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read: {}", source.display()))?
    };
    marktree_pulldown::parse(&content)
        .with_context(|| format!("Failed to parse: {}", source.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render_flags() {
        let cli = Cli::try_parse_from([
            "marktree",
            "render",
            "doc.md",
            "-r",
            "json",
            "--compact",
        ])
        .unwrap();
        match cli.command {
            Command::Render {
                renderer: Renderer::Json,
                compact: true,
                ..
            } => {}
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_defaults_to_markdown() {
        let cli = Cli::try_parse_from(["marktree", "render", "doc.md"]).unwrap();
        match cli.command {
            Command::Render {
                renderer: Renderer::Markdown,
                compact: false,
                include_code: false,
                keep_punctuation: false,
                ..
            } => {}
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_renderer() {
        assert!(Cli::try_parse_from(["marktree", "render", "doc.md", "-r", "yaml"]).is_err());
    }

    #[test]
    fn test_cli_tree_subcommand() {
        let cli = Cli::try_parse_from(["marktree", "tree", "-"]).unwrap();
        assert!(matches!(cli.command, Command::Tree { .. }));
    }
}
