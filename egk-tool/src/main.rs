use std::error::Error;
use std::ffi::CStr;
use std::process::ExitCode;

use clap::Parser;
use egk_card::card::version::HealthCardVersion2;
use egk_card::certificate::retrieve_certificate;
use egk_card::channel::{PlainChannel, SecureChannel};
use egk_card::command::{ExpectedLength, HealthCardCommand};
use egk_card::iso7816::card::PcscTransport;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;


#[derive(Clone, Debug, Eq, Hash, Ord, Parser, PartialEq, PartialOrd)]
enum Mode {
    /// Lists the available PC/SC readers.
    ListReaders,

    /// Reads EF.Version2 without authentication.
    ReadVersion(ReaderOpts),

    /// Establishes PACE and reads the authentication certificate.
    ReadCertificate(CertificateOpts),
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, Parser, PartialEq, PartialOrd)]
struct ReaderOpts {
    #[arg(short, long = "reader", default_value = "0")]
    pub reader_index: usize,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, Parser, PartialEq, PartialOrd)]
struct CertificateOpts {
    #[arg(short, long = "reader", default_value = "0")]
    pub reader_index: usize,

    /// The six-digit card access number printed on the card.
    #[arg(short, long)]
    pub can: String,

    /// Use extended length APDUs; the reader must support them.
    #[arg(short, long)]
    pub extended_length: bool,

    #[arg(short, long)]
    pub verbose: bool,
}


fn hexdump(buf: &[u8]) {
    for (line_index, line) in buf.chunks(16).enumerate() {
        print!("{:08X}  ", line_index * 16);

        for i in 0..16 {
            match line.get(i) {
                Some(b) => print!(" {:02X}", b),
                None => print!("   "),
            }
        }

        print!(" |");
        for &b in line {
            if b >= b' ' && b <= b'~' {
                print!("{}", char::from(b));
            } else {
                print!(".");
            }
        }
        println!("|");
    }
}


fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}


fn connect(ctx: &pcsc::Context, reader_index: usize) -> Result<pcsc::Card, Box<dyn Error>> {
    let readers_buf_len = ctx.list_readers_len()?;
    let mut readers_buf = vec![0u8; readers_buf_len];
    let mut readers = ctx.list_readers(&mut readers_buf)?;
    let reader: &CStr = readers.nth(reader_index)
        .ok_or_else(|| format!("no reader at index {}", reader_index))?;
    info!("connecting to {:?}", reader);
    let card = ctx.connect(reader, pcsc::ShareMode::Shared, pcsc::Protocols::ANY)?;
    Ok(card)
}


fn run(mode: Mode) -> Result<(), Box<dyn Error>> {
    let ctx = pcsc::Context::establish(pcsc::Scope::User)?;

    match mode {
        Mode::ListReaders => {
            setup_tracing(false);
            let readers_buf_len = ctx.list_readers_len()?;
            let mut readers_buf = vec![0u8; readers_buf_len];
            for (i, reader) in ctx.list_readers(&mut readers_buf)?.enumerate() {
                println!("{}: {:?}", i, reader);
            }
        },
        Mode::ReadVersion(opts) => {
            setup_tracing(opts.verbose);
            let card = connect(&ctx, opts.reader_index)?;
            let mut channel = PlainChannel::new(PcscTransport::new(card, false));

            HealthCardCommand::select_root()
                .execute_successful_on(&mut channel)?;
            let response = HealthCardCommand::read_version2(ExpectedLength::All)
                .execute_successful_on(&mut channel)?;
            println!("EF.Version2:");
            hexdump(response.apdu.data());

            let version = HealthCardVersion2::parse(response.apdu.data())
                .ok_or("failed to parse EF.Version2")?;
            if let Some([major, minor, revision]) = version.object_system_version() {
                println!("object system version: {}.{}.{}", major, minor, revision);
            }
            println!("generation 2.1 or later: {}", version.is_egk21());
        },
        Mode::ReadCertificate(opts) => {
            setup_tracing(opts.verbose);
            let card = connect(&ctx, opts.reader_index)?;
            let transport = PcscTransport::new(card, opts.extended_length);

            let mut channel = SecureChannel::establish(transport, &opts.can)?;
            info!("secure channel established");
            let certificate = retrieve_certificate(&mut channel)?;
            println!("C.CH.AUT.E256 ({} bytes):", certificate.len());
            hexdump(&certificate);
        },
    }
    Ok(())
}


fn main() -> ExitCode {
    let mode = Mode::parse();
    match run(mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}
