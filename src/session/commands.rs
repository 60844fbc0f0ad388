// Mon Oct 12 2026 - Alex

use crate::config::ConfigError;
use crate::memory::{Address, AttachGuard, Endianness, MemoryError, MemoryTarget};
use crate::session::{Session, SessionError};
use crate::store::{locate_region, MatchLocation};
use crate::ui::display::{format_match, format_value, hexdump};
use crate::value::{
    parse_bytearray, ByteMask, NumberValue, ScanDataType, ScanMatchType, ScanTarget, Value, ValueError, Widths,
};
use log::warn;
use std::io::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct CommandInfo {
    pub name: &'static str,
    pub usage: &'static str,
    pub about: &'static str,
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo { name: "<value>", usage: "<n> | <lo>..<hi> | <hex bytes>", about: "scan for a value, or narrow the matches to it" },
    CommandInfo { name: "\"", usage: "\" <text>", about: "scan for a string (data type string)" },
    CommandInfo { name: "=", usage: "= [n]", about: "equal to n, or unchanged" },
    CommandInfo { name: "!=", usage: "!= [n]", about: "not equal to n, or changed" },
    CommandInfo { name: "<", usage: "< [n]", about: "less than n, or decreased" },
    CommandInfo { name: ">", usage: "> [n]", about: "greater than n, or increased" },
    CommandInfo { name: "+", usage: "+ [n]", about: "increased by n, or increased" },
    CommandInfo { name: "-", usage: "- [n]", about: "decreased by n, or decreased" },
    CommandInfo { name: "update", usage: "update", about: "refresh the stored values of all matches" },
    CommandInfo { name: "snapshot", usage: "snapshot", about: "record every address, to narrow down with relative scans" },
    CommandInfo { name: "reset", usage: "reset", about: "forget all matches and reload the regions" },
    CommandInfo { name: "pid", usage: "pid [n]", about: "show or change the target process" },
    CommandInfo { name: "list", usage: "list", about: "list the current matches" },
    CommandInfo { name: "delete", usage: "delete <id>", about: "drop one match" },
    CommandInfo { name: "dregion", usage: "dregion [!]<id>[,<id>...]", about: "drop regions (or all others) and their matches" },
    CommandInfo { name: "lregions", usage: "lregions", about: "list the regions being scanned" },
    CommandInfo { name: "set", usage: "set [<id>,...=]<n>[/<secs>] ...", about: "write n to matches, optionally every secs seconds" },
    CommandInfo { name: "watch", usage: "watch <id>", about: "print a match every time it changes" },
    CommandInfo { name: "dump", usage: "dump <addr> <len> [file]", about: "hex dump memory, or save it to a file" },
    CommandInfo { name: "write", usage: "write <i8|i16|i32|i64|f32|f64|bytearray|string> <addr> <value>", about: "write a value at an address" },
    CommandInfo { name: "option", usage: "option [<name> <value>]", about: "show or change an option" },
    CommandInfo { name: "help", usage: "help", about: "show this list" },
    CommandInfo { name: "version", usage: "version", about: "show the version" },
    CommandInfo { name: "exit", usage: "exit", about: "leave" },
];

/// Largest `dump` accepted in one command.
pub const MAX_DUMP_LEN: usize = 16 << 20;

fn usage(name: &str) -> SessionError {
    let text = COMMANDS
        .iter()
        .find(|c| c.name == name)
        .map_or(name, |c| c.usage);
    SessionError::Usage(text.to_string())
}

fn parse_address(s: &str) -> Result<Address, SessionError> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map(Address::new)
        .map_err(|_| SessionError::Value(ValueError::BadNumber(s.to_string())))
}

fn parse_count(s: &str) -> Result<usize, SessionError> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    };
    parsed.ok_or_else(|| SessionError::Value(ValueError::BadNumber(s.to_string())))
}

fn timestamp() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

/// Runs one command line against the session, writing its output to `out`.
pub fn execute<T: MemoryTarget>(session: &mut Session<T>, line: &str, out: &mut dyn Write) -> Result<(), SessionError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }
    if let Some(text) = line.strip_prefix('"') {
        return string_scan(session, text.strip_prefix(' ').unwrap_or(text), out);
    }

    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match name {
        "=" | "!=" | "<" | ">" | "+" | "-" => operator_scan(session, name, &args, out),
        "update" => {
            session.update()?;
            report_count(session, out)
        }
        "snapshot" => {
            session.snapshot()?;
            report_count(session, out)
        }
        "reset" => {
            session.reset()?;
            writeln!(out, "info: {} regions to scan.", session.regions().len())?;
            Ok(())
        }
        "pid" => pid(session, &args, out),
        "list" => list(session, out),
        "delete" => {
            let id = args.first().ok_or_else(|| usage("delete"))?;
            session.delete_match(parse_count(id)?)?;
            Ok(())
        }
        "dregion" => dregion(session, &args, out),
        "lregions" => lregions(session, out),
        "set" => set(session, &args, out),
        "watch" => watch(session, &args, out),
        "dump" => dump(session, &args, out),
        "write" => write(session, &args, out),
        "option" => option(session, &args, out),
        "help" => help(out),
        "version" => {
            writeln!(out, "memscan {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        "exit" | "quit" => {
            session.request_exit();
            Ok(())
        }
        _ => default_scan(session, line, out),
    }
}

fn report_count<T: MemoryTarget>(session: &Session<T>, out: &mut dyn Write) -> Result<(), SessionError> {
    writeln!(out, "info: we currently have {} matches.", session.match_count())?;
    Ok(())
}

fn run_scan<T: MemoryTarget>(
    session: &mut Session<T>,
    match_type: ScanMatchType,
    target: ScanTarget,
    out: &mut dyn Write,
) -> Result<(), SessionError> {
    let request = session.request(match_type, target);
    session.scan(&request)?;
    report_count(session, out)
}

fn default_scan<T: MemoryTarget>(session: &mut Session<T>, line: &str, out: &mut dyn Write) -> Result<(), SessionError> {
    let unknown = || SessionError::UnknownCommand(line.split_whitespace().next().unwrap_or(line).to_string());
    match session.options().scan_data_type {
        ScanDataType::ByteArray => {
            let pattern = parse_bytearray(line.split_whitespace())?;
            run_scan(session, ScanMatchType::EqualTo, ScanTarget::Bytes(pattern), out)
        }
        ScanDataType::String => Err(usage("\"")),
        _ if line.contains("..") => run_scan(session, ScanMatchType::Range, ScanTarget::range(line)?, out),
        _ => {
            let target = ScanTarget::number(line).map_err(|_| unknown())?;
            run_scan(session, ScanMatchType::EqualTo, target, out)
        }
    }
}

fn string_scan<T: MemoryTarget>(session: &mut Session<T>, text: &str, out: &mut dyn Write) -> Result<(), SessionError> {
    if session.options().scan_data_type != ScanDataType::String {
        return Err(SessionError::Unsupported(format!(
            "string search with data type {}",
            session.options().scan_data_type
        )));
    }
    let target = ScanTarget::text(text)?;
    run_scan(session, ScanMatchType::EqualTo, target, out)
}

fn operator_scan<T: MemoryTarget>(
    session: &mut Session<T>,
    op: &str,
    args: &[&str],
    out: &mut dyn Write,
) -> Result<(), SessionError> {
    if !session.options().scan_data_type.is_numeric() {
        return Err(SessionError::Unsupported(format!("`{}` with data type {}", op, session.options().scan_data_type)));
    }
    let value = args.join(" ");
    let match_type = ScanMatchType::from_operator(op, !value.is_empty()).ok_or_else(|| usage(op))?;
    let target = if value.is_empty() {
        ScanTarget::None
    } else {
        ScanTarget::number(&value)?
    };
    run_scan(session, match_type, target, out)
}

fn pid<T: MemoryTarget>(session: &mut Session<T>, args: &[&str], out: &mut dyn Write) -> Result<(), SessionError> {
    match args.first() {
        None => {
            let target = session.target().ok_or(SessionError::NoTarget)?;
            writeln!(out, "info: target pid is {}.", target.pid())?;
        }
        Some(arg) => {
            let pid: i32 = arg
                .parse()
                .map_err(|_| SessionError::Value(ValueError::BadNumber(arg.to_string())))?;
            session.open_pid(pid)?;
            writeln!(out, "info: {} regions to scan in process {}.", session.regions().len(), pid)?;
        }
    }
    Ok(())
}

fn list<T: MemoryTarget>(session: &Session<T>, out: &mut dyn Write) -> Result<(), SessionError> {
    let matches = session.matches().ok_or(SessionError::NoMatches)?;
    let order = session.options().endianness;
    for (i, (loc, address, _)) in matches.matches().enumerate() {
        let value = format_match(matches, loc, order)?;
        match locate_region(address, session.regions()) {
            Some(region) => writeln!(
                out,
                "[{:2}] {:12x}, {:2} + {:12x}, {:>5}, {}",
                i,
                address,
                region.id(),
                region.offset_of(address),
                region.region_type().name(),
                value
            )?,
            None => writeln!(out, "[{:2}] {:12x}, {:>2} + {:>12}, {:>5}, {}", i, address, "??", "??", "??", value)?,
        }
    }
    Ok(())
}

fn dregion<T: MemoryTarget>(session: &mut Session<T>, args: &[&str], out: &mut dyn Write) -> Result<(), SessionError> {
    let joined = args.concat();
    if joined.is_empty() {
        return Err(usage("dregion"));
    }
    let (invert, list) = match joined.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, joined.as_str()),
    };
    let ids = list
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().map_err(|_| usage("dregion")))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(usage("dregion"));
    }
    let removed = session.delete_regions(&ids, invert)?;
    writeln!(out, "info: removed {} matches, {} regions left.", removed, session.regions().len())?;
    Ok(())
}

fn lregions<T: MemoryTarget>(session: &Session<T>, out: &mut dyn Write) -> Result<(), SessionError> {
    if session.regions().is_empty() {
        writeln!(out, "info: no regions are being scanned.")?;
    }
    for region in session.regions() {
        writeln!(out, "{}", region)?;
    }
    Ok(())
}

/// Locations picked by `set`: the listed ids, or every match.
fn selected<T: MemoryTarget>(session: &Session<T>, ids: Option<&str>) -> Result<Vec<MatchLocation>, SessionError> {
    match ids {
        Some(ids) => ids
            .split(',')
            .map(|id| parse_count(id.trim()).and_then(|n| session.nth(n)))
            .collect(),
        None => {
            let matches = session.matches().ok_or(SessionError::NoMatches)?;
            Ok(matches.matches().map(|(loc, _, _)| loc).collect())
        }
    }
}

/// One `[ids=]value[/secs]` argument of `set`, resolved to the writes it
/// performs. `every == 0` means the block is written once.
struct SetBlock {
    writes: Vec<(Address, Vec<u8>)>,
    every: u64,
}

impl SetBlock {
    fn due(&self, tick: u64) -> bool {
        tick == 0 || (self.every > 0 && tick % self.every == 0)
    }
}

fn parse_set_block<T: MemoryTarget>(
    session: &Session<T>,
    block: &str,
    out: &mut dyn Write,
) -> Result<SetBlock, SessionError> {
    let (ids, rest) = match block.split_once('=') {
        Some((ids, rest)) => (Some(ids), rest),
        None => (None, block),
    };
    let (value, every) = match rest.split_once('/') {
        Some((value, secs)) => {
            let secs: u64 = secs.parse().map_err(|_| usage("set"))?;
            if secs == 0 {
                writeln!(out, "info: zero delay for `{}`, writing it once.", block)?;
            } else {
                writeln!(
                    out,
                    "info: setting {} every {} seconds until interrupted.",
                    ids.unwrap_or("all"),
                    secs
                )?;
            }
            (value, secs)
        }
        None => (rest, 0),
    };
    let value = NumberValue::parse(value)?;

    let order = session.options().endianness;
    let matches = session.matches().ok_or(SessionError::NoMatches)?;
    let mut writes = Vec::new();
    for loc in selected(session, ids)? {
        let address = matches.address_of(loc)?;
        let widths = matches.entry(loc)?.flags.widths();
        match value.encode(widths, order) {
            Ok(bytes) => writes.push((address, bytes)),
            Err(e) => warn!("not setting {}: {}", address, e),
        }
    }
    if writes.is_empty() {
        return Err(ValueError::NoCommonWidth.into());
    }
    Ok(SetBlock { writes, every })
}

fn set<T: MemoryTarget>(session: &mut Session<T>, args: &[&str], out: &mut dyn Write) -> Result<(), SessionError> {
    if args.is_empty() {
        return Err(usage("set"));
    }
    if !session.options().scan_data_type.is_numeric() {
        return Err(SessionError::Unsupported(format!("set with data type {}", session.options().scan_data_type)));
    }
    if session.matches().is_none() {
        return Err(SessionError::NoMatches);
    }

    let mut blocks = Vec::with_capacity(args.len());
    for block in args {
        blocks.push(parse_set_block(session, block, out)?);
    }
    let continuous = blocks.iter().any(|b| b.every > 0);

    let cancel = session.cancel_token().clone();
    let poll = Duration::from_millis(session.options().poll_interval_ms);
    let _interrupt = cancel.interruptible();

    let mut tick = 0u64;
    loop {
        {
            let target = session.target_mut()?;
            let mut guard = AttachGuard::new(target)?;
            for block in blocks.iter().filter(|b| b.due(tick)) {
                for (address, bytes) in &block.writes {
                    guard.write_bytes(*address, bytes)?;
                }
            }
        }
        if !continuous {
            break;
        }
        if cancel.sleep(Duration::from_secs(1), poll) {
            writeln!(out, "info: stopped setting values.")?;
            break;
        }
        tick += 1;
    }
    Ok(())
}

fn watch<T: MemoryTarget>(session: &mut Session<T>, args: &[&str], out: &mut dyn Write) -> Result<(), SessionError> {
    let id = args.first().ok_or_else(|| usage("watch"))?;
    let loc = session.nth(parse_count(id)?)?;
    let matches = session.matches().ok_or(SessionError::NoMatches)?;
    let flags = matches.entry(loc)?.flags;
    if !flags.is_numeric() {
        return Err(SessionError::Unsupported(format!("watching a {}", flags)));
    }
    let address = matches.address_of(loc)?;

    let order = session.options().endianness;
    let poll = Duration::from_millis(session.options().poll_interval_ms);
    let cancel = session.cancel_token().clone();
    let _interrupt = cancel.interruptible();
    writeln!(out, "info: watching {} for changes until interrupted.", address)?;

    let mut last: Option<Value> = None;
    loop {
        let bytes = session.read_at(address, flags.extent())?;
        let value = Value::from_bytes(&bytes).truncated(flags.widths());
        if last != Some(value) {
            writeln!(out, "{} {}: {}", timestamp(), address, format_value(&value, order))?;
            last = Some(value);
        }
        if cancel.sleep(poll, poll) {
            break;
        }
    }
    Ok(())
}

fn dump<T: MemoryTarget>(session: &mut Session<T>, args: &[&str], out: &mut dyn Write) -> Result<(), SessionError> {
    if args.len() < 2 {
        return Err(usage("dump"));
    }
    let address = parse_address(args[0])?;
    let len = parse_count(args[1])?;
    if len == 0 || len > MAX_DUMP_LEN {
        return Err(SessionError::Usage(format!(
            "dump length must be between 1 and {:#x} bytes",
            MAX_DUMP_LEN
        )));
    }
    let bytes = session.read_at(address, len)?;
    if bytes.len() < len {
        warn!("only {} of {} bytes at {} are readable", bytes.len(), len, address);
    }

    match args.get(2) {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            writeln!(out, "info: wrote {} bytes to {}.", bytes.len(), path)?;
        }
        None => write!(out, "{}", hexdump(address, &bytes, session.options().dump_with_ascii))?,
    }
    Ok(())
}

fn encode_number(rest: &[&str], widths: Widths, order: Endianness) -> Result<Vec<u8>, SessionError> {
    let value = NumberValue::parse(&rest.join(" "))?;
    Ok(value.encode(widths, order)?)
}

fn write<T: MemoryTarget>(session: &mut Session<T>, args: &[&str], out: &mut dyn Write) -> Result<(), SessionError> {
    if args.len() < 3 {
        return Err(usage("write"));
    }
    let address = parse_address(args[1])?;
    let rest = &args[2..];
    let order = session.options().endianness;

    let data = match args[0] {
        "i8" | "int8" => encode_number(rest, Widths::INT8, order)?,
        "i16" | "int16" => encode_number(rest, Widths::INT16, order)?,
        "i32" | "int32" => encode_number(rest, Widths::INT32, order)?,
        "i64" | "int64" => encode_number(rest, Widths::INT64, order)?,
        "f32" | "float32" => encode_number(rest, Widths::F32, order)?,
        "f64" | "float64" => encode_number(rest, Widths::F64, order)?,
        "bytearray" => {
            let pattern = parse_bytearray(rest.iter().copied())?;
            let current = session.read_at(address, pattern.len())?;
            if current.len() < pattern.len() {
                return Err(MemoryError::ReadFailed(address.as_u64()).into());
            }
            pattern
                .iter()
                .zip(current)
                .map(|(mask, old)| match mask {
                    ByteMask::Exact(b) => *b,
                    ByteMask::Wildcard => old,
                })
                .collect::<Vec<u8>>()
        }
        "string" => {
            let text = rest.join(" ");
            if text.is_empty() {
                return Err(ValueError::EmptyString.into());
            }
            text.into_bytes()
        }
        _ => return Err(usage("write")),
    };

    session.write_at(address, &data)?;
    writeln!(out, "info: wrote {} bytes at {}.", data.len(), address)?;
    Ok(())
}

fn option<T: MemoryTarget>(session: &mut Session<T>, args: &[&str], out: &mut dyn Write) -> Result<(), SessionError> {
    match args {
        [] => {
            let text = serde_json::to_string_pretty(session.options()).map_err(ConfigError::from)?;
            writeln!(out, "{}", text)?;
        }
        [name, value] => {
            session.options_mut().set(name, value)?;
            if *name == "region_scan_level" {
                writeln!(out, "info: run `reset` for the new scan level to take effect.")?;
            }
        }
        _ => return Err(usage("option")),
    }
    Ok(())
}

fn help(out: &mut dyn Write) -> Result<(), SessionError> {
    for command in COMMANDS {
        writeln!(out, "{:<10} {:<44} {}", command.name, command.usage, command.about)?;
    }
    Ok(())
}
