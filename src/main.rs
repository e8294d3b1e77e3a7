use std::path::PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use anyhow::{ensure, Context, Result};

use ifdmap::firmware::{Firmware, FirmwareStructure};
use ifdmap::logger;
use ifdmap::structures::descriptor_map::DescriptorMap;

fn show(map: FirmwareStructure<DescriptorMap>) -> Result<()> {
    println!("{:#06x}: {}", map.offset(), *map);
    Ok(())
}

fn summary(map: FirmwareStructure<DescriptorMap>) -> Result<()> {
    println!("{}", map.summary());
    Ok(())
}

fn validate(map: FirmwareStructure<DescriptorMap>) -> Result<()> {
    let errors = map.validate();
    for error in &errors {
        println!("{}", error);
    }
    ensure!(
        errors.is_empty(),
        "{} consistency error(s) in flash descriptor map at {:#x}",
        errors.len(),
        map.offset()
    );
    println!("OK");
    Ok(())
}

fn parse_offset(value: &str) -> Result<usize> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.with_context(|| format!("Invalid offset {value:?}"))
}

#[derive(Debug, Clone, Subcommand)]
enum CliCommand {
    #[command(name="show")]
    Show,
    #[command(name="summary")]
    Summary,
    #[command(name="validate")]
    Validate,
}

#[derive(Debug, Clone, Parser)]
struct CliArgs {
    firmware_path: PathBuf,
    /// Offset of FLMAP0 in the image; probed from the descriptor signature if omitted
    #[arg(long, value_parser=parse_offset)]
    offset: Option<usize>,
    #[arg(short, long, action=ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: CliCommand
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    logger::init(args.verbose);

    let firmware = Firmware::read(&args.firmware_path).context("Could not open firmware")?;
    let offset = args.offset.unwrap_or_else(|| firmware.descriptor_map_offset());
    let map = firmware.read_descriptor_map(offset)?;
    match args.command {
        CliCommand::Show => show(map),
        CliCommand::Summary => summary(map),
        CliCommand::Validate => validate(map),
    }
}
