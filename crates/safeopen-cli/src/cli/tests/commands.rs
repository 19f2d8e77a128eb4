//! Tests for open, create, checksum, exhaust, completions.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_open() {
    match parse(&["safeopen", "open", "/etc/hosts"]).command {
        CliCommand::Open { path } => assert_eq!(path, Path::new("/etc/hosts")),
        other => panic!("expected Open, got {:?}", other),
    }
}

#[test]
fn cli_parse_create() {
    match parse(&["safeopen", "create", "out.txt"]).command {
        CliCommand::Create { path } => assert_eq!(path, Path::new("out.txt")),
        other => panic!("expected Create, got {:?}", other),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["safeopen", "checksum", "file.iso"]).command {
        CliCommand::Checksum { path } => assert_eq!(path, Path::new("file.iso")),
        other => panic!("expected Checksum, got {:?}", other),
    }
}

#[test]
fn cli_parse_exhaust_defaults() {
    match parse(&["safeopen", "exhaust"]).command {
        CliCommand::Exhaust { path, limit } => {
            assert_eq!(path, Path::new("/dev/null"));
            assert_eq!(limit, 16);
        }
        other => panic!("expected Exhaust, got {:?}", other),
    }
}

#[test]
fn cli_parse_exhaust_custom() {
    match parse(&["safeopen", "exhaust", "/tmp/x", "--limit", "32"]).command {
        CliCommand::Exhaust { path, limit } => {
            assert_eq!(path, Path::new("/tmp/x"));
            assert_eq!(limit, 32);
        }
        other => panic!("expected Exhaust, got {:?}", other),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["safeopen", "completions", "bash"]).command {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        other => panic!("expected Completions, got {:?}", other),
    }
}

#[test]
fn cli_rejects_missing_path() {
    assert!(Cli::try_parse_from(["safeopen", "open"]).is_err());
}
