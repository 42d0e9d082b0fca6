//! Entrypoint for CLI
mod clock;
mod config;
mod error;

use std::{env, error::Error, fs, time::Instant};

use chip8_core::{prelude::*, IMPL_VERSION};
use log::{debug, error, info, warn, LevelFilter};

use self::{clock::Clock, config::RunConf, error::AppError};

static USAGE: &str = r#"
usage: chip8 CMD FILE [CONFIG]

commands:
    run     Run the target ROM file headless and print the final display
    dis     Disassemble the target ROM into readable assembly

examples:
    chip8 run maze.ch8
    chip8 run pong.ch8 pong.yaml
    chip8 dis maze.ch8

environment:
    RUST_LOG    log level filter, eg. RUST_LOG=debug
"#;

fn run_rom(filepath: &str, conf: RunConf) -> Result<(), AppError> {
    info!("running {filepath}");

    let bytecode = fs::read(filepath)?;

    let mut vm = Machine::new(MachineConf {
        trace: conf.trace,
        seed: conf.seed,
    });
    vm.load_program(&bytecode)?;

    let start = Instant::now();
    let result = drive(&mut vm, &conf);
    let end = Instant::now();

    println!(
        "time taken: {}ms",
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    ); // to millis
    println!("{}", vm.display_snapshot());

    result
}

/// Step the machine at the configured cadence, applying scripted key events.
fn drive(vm: &mut Machine, conf: &RunConf) -> Result<(), AppError> {
    let mut clock = Clock::new(conf.frequency.into());
    let mut keys = conf.key_schedule().into_iter().peekable();
    let mut buzzer = false;

    for step in 0..conf.steps {
        while let Some(event) = keys.next_if(|ev| ev.step <= step) {
            debug!("step {step}: {} {}", event.key, if event.pressed { "down" } else { "up" });
            vm.set_key(event.key, event.pressed);
        }

        match vm.step()? {
            Flow::Unimplemented(opcode) if conf.strict => {
                let address = vm.pc().wrapping_sub(2);
                return Err(Chip8Error::UnimplementedOpcode { address, opcode }.into());
            }
            Flow::KeyWait if keys.peek().is_none() => {
                warn!("step {step}: waiting for a key press that is never scripted");
                break;
            }
            _ => {}
        }

        // Buzzer should be on while sound timer counts down,
        // then turned off when the timer reaches zero.
        if vm.is_sound_active() != buzzer {
            buzzer = vm.is_sound_active();
            debug!("step {step}: buzzer {}", if buzzer { "on" } else { "off" });
        }

        clock.wait();
    }

    Ok(())
}

fn run_disassembler(filepath: &str) -> Result<(), AppError> {
    info!("disassembling {filepath}");

    let bytecode = fs::read(filepath)?;

    // Instructions are always 2 bytes. A trailing odd byte is data.
    for (i, chunk) in bytecode.chunks(2).enumerate() {
        let offset = chip8_core::constants::MEM_START + i * 2;
        match *chunk {
            [a, b] => {
                let word = u16::from_be_bytes([a, b]);
                println!("0x{offset:04X} {word:04X} {}", Instruction::decode(word));
            }
            [a] => println!("0x{offset:04X} {a:02X}"),
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cmd = match parse_args() {
        Some(cmd) => cmd,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    let result = match cmd {
        Cmd::Run { filepath, config } => {
            let conf = match config {
                Some(path) => RunConf::from_file(&path),
                None => Ok(RunConf::default()),
            };
            let level = match &conf {
                Ok(conf) if conf.trace => LevelFilter::Trace,
                _ => LevelFilter::Info,
            };
            init_logger(level)?;
            conf.and_then(|conf| run_rom(&filepath, conf))
        }
        Cmd::Dis { filepath } => {
            init_logger(LevelFilter::Info)?;
            run_disassembler(&filepath)
        }
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next() {
        Some(cmd) => {
            // don't format me T.T
            match cmd.as_str() {
                "run" => Some(Cmd::Run {
                    filepath: args.next()?,
                    config: args.next(),
                }),
                "dis" => Some(Cmd::Dis {
                    filepath: args.next()?,
                }),
                _ => None,
            }
        }
        None => None,
    }
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Run file
    Run {
        filepath: String,
        config: Option<String>,
    },
    /// Disassemble
    Dis { filepath: String },
}
