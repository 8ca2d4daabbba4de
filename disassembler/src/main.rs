use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::LevelFilter;
use serde::Serialize;
use std::path::{Path, PathBuf};

use mohawk_script::{read_script, Instruction, LoggerConfig, OpcodeTable, Script, ScriptKind};

#[derive(Debug, Serialize)]
pub struct Listing {
    kind: ScriptKind,
    size: usize,
    records: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct Record {
    index: usize,
    offset: usize,
    mnemonic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<u16>,
    var: u16,
    args: Vec<u16>,
}

impl Record {
    fn new(index: usize, offset: usize, inst: &Instruction, opcodes: &OpcodeTable) -> Self {
        Self {
            index,
            offset,
            mnemonic: opcodes.describe(inst.opcode).into_owned(),
            resource: inst.resource_id,
            var: inst.var,
            args: inst.args.clone(),
        }
    }
}

pub struct Disassembler {
    bytes: Vec<u8>,
    kind: ScriptKind,
    opcodes: OpcodeTable,
}

impl Disassembler {
    pub fn new(input: impl AsRef<Path>, kind: ScriptKind) -> Result<Self> {
        let input = input.as_ref();
        let bytes = std::fs::read(input)
            .with_context(|| format!("reading script {}", input.display()))?;
        Ok(Self::from_bytes(bytes, kind))
    }

    pub fn from_bytes(bytes: Vec<u8>, kind: ScriptKind) -> Self {
        Self {
            bytes,
            kind,
            opcodes: OpcodeTable::common(),
        }
    }

    fn script(&self) -> Result<Script> {
        Ok(read_script(&self.bytes, self.kind)?)
    }

    pub fn disassemble(&self) -> Result<Listing> {
        let script = self.script()?;
        // record stream starts after the count word
        let mut offset = 2;
        let mut records = Vec::with_capacity(script.len());
        for (index, inst) in script.iter().enumerate() {
            records.push(Record::new(index, offset, inst, &self.opcodes));
            offset += inst.encoded_len();
        }
        for record in records.iter().filter(|r| r.mnemonic.starts_with("Opcode ")) {
            log::warn!("record {}: opcode not in the common table", record.index);
        }

        Ok(Listing {
            kind: self.kind,
            size: self.bytes.len(),
            records,
        })
    }

    pub fn write_listing(&self, path: impl AsRef<Path>) -> Result<()> {
        let listing = self.disassemble()?;
        let output = path.as_ref();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = std::fs::File::create(output)?;
        serde_yaml::to_writer(&mut writer, &listing)?;
        log::info!(
            "wrote {} records to {}",
            listing.records.len(),
            output.display()
        );
        Ok(())
    }
}

/// Lists a compiled Myst script as YAML
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, required = true)]
    input: PathBuf,

    #[arg(short, long, required = true)]
    output: PathBuf,

    /// Script flavour: normal, init or exit
    #[arg(short, long, default_value = "normal")]
    kind: ScriptKind,

    #[arg(long)]
    log_level: Option<LevelFilter>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let logger = LoggerConfig {
        level_filter: args.log_level.unwrap_or(LoggerConfig::default().level_filter),
    };
    env_logger::Builder::new()
        .filter_level(logger.level_filter)
        .parse_default_env()
        .init();

    let disassembler = Disassembler::new(&args.input, args.kind)?;
    disassembler.write_listing(&args.output)?;

    Ok(())
}
