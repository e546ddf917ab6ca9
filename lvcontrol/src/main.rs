mod config;

use config::Config;
use eyre::{bail, eyre, Report, WrapErr};
use log::info;
use lvserial::{RegisterId, SerialPortTransport, Servo};
use std::env;
use std::path::PathBuf;
use std::process::exit;

const USAGE: &str = "Usage:
  {this} [--config <file>] ping
  {this} [--config <file>] init
  {this} [--config <file>] read <register>
  {this} [--config <file>] write <register> <value>
  {this} [--config <file>] power on|off
  {this} [--config <file>] unlock|lock
  {this} [--config <file>] target <position>
  {this} [--config <file>] status
  {this} registers";

fn main() -> Result<(), Report> {
    stable_eyre::install()?;
    pretty_env_logger::init();
    color_backtrace::install();

    let mut args = env::args();
    let binary_name = args.next().ok_or_else(|| eyre!("Binary name missing"))?;
    let mut args: Vec<String> = args.collect();

    let mut config_path = None;
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            usage(&binary_name);
        }
        config_path = Some(PathBuf::from(args.remove(1)));
        args.remove(0);
    }
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    if args == ["registers"] {
        print_registers();
        return Ok(());
    }
    if args.is_empty() {
        usage(&binary_name);
    }

    let config = match config_path {
        Some(path) => Config::read(&path)?,
        None => Config::from_default_file()?,
    };
    let port = serialport::new(&config.port, config.baud_rate)
        .open()
        .wrap_err_with(|| format!("Failed to open serial port {}", config.port))?;
    info!("Opened {} at {} baud", config.port, config.baud_rate);

    let mut servo = Servo::with_device(SerialPortTransport::new(port), config.device()?);
    servo.set_timeout(config.timeout());

    run(&mut servo, &args).unwrap_or_else(|| usage(&binary_name))
}

/// Runs a single command. Returns `None` if the arguments don't make sense.
fn run(servo: &mut Servo<SerialPortTransport>, args: &[&str]) -> Option<Result<(), Report>> {
    let result = match *args {
        ["ping"] => servo
            .ping()
            .map(|product_number| println!("Product number {:#06x}", product_number)),
        ["init"] => servo
            .init(None)
            .map(|product_number| println!("Product number {:#06x}, unlocked", product_number)),
        ["read", register] => {
            let register = match parse_register(register) {
                Ok(register) => register,
                Err(e) => return Some(Err(e)),
            };
            servo
                .read_register(register)
                .map(|value| println!("{} = {} ({:#x})", register, value, value))
        }
        ["write", register, value] => {
            let (register, value) = match (parse_register(register), parse_value(value)) {
                (Ok(register), Ok(value)) => (register, value),
                (Err(e), _) | (_, Err(e)) => return Some(Err(e)),
            };
            servo.write_register(register, value)
        }
        ["power", "on"] => servo.power_on(),
        ["power", "off"] => servo.power_off(),
        ["unlock"] => servo.release_write_protection(true),
        ["lock"] => servo.release_write_protection(false),
        ["target", position] => match parse_value(position).and_then(|p| Ok(u16::try_from(p)?)) {
            Ok(position) => servo.write_target_pos(position),
            Err(e) => return Some(Err(e)),
        },
        ["status"] => return Some(print_status(servo)),
        _ => return None,
    };
    Some(result.wrap_err_with(|| format!("Servo {} failed", servo.device())))
}

fn print_status(servo: &mut Servo<SerialPortTransport>) -> Result<(), Report> {
    println!("Position:    {}", servo.read_now_pos()?);
    println!("Speed:       {}", servo.read_now_speed()?);
    println!("Voltage:     {:.2} V", servo.read_power_voltage()?);
    println!("Back EMF:    {:.2} V", servo.read_back_emf()?);
    println!("Temperature: {}", servo.read_temperature()?);
    Ok(())
}

fn print_registers() {
    println!("{:<8} {:>7} {:>5}  access", "name", "address", "width");
    for &register in RegisterId::ALL {
        let spec = register.spec();
        println!(
            "{:<8} {:>#7x} {:>5}  {}",
            register.name(),
            spec.address,
            spec.width.bytes(),
            if spec.writable { "rw" } else { "r" }
        );
    }
}

fn parse_register(name: &str) -> Result<RegisterId, Report> {
    name.parse().wrap_err_with(|| format!("Invalid register {:?}", name))
}

/// Parses a decimal or `0x` prefixed hexadecimal value.
fn parse_value(input: &str) -> Result<u32, Report> {
    let parsed = if let Some(hex) = input.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        input.parse()
    };
    match parsed {
        Ok(value) => Ok(value),
        Err(e) => bail!("Invalid value {:?}: {}", input, e),
    }
}

fn usage(binary_name: &str) -> ! {
    eprintln!("{}", USAGE.replace("{this}", binary_name));
    exit(1);
}
