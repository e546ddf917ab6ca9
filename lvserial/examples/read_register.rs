use eyre::{eyre, Report, WrapErr};
use lvserial::{DeviceAddress, RegisterId, SerialPortTransport, Servo, DEFAULT_BAUD_RATE};
use std::env;
use std::process::exit;

fn main() -> Result<(), Report> {
    stable_eyre::install()?;
    pretty_env_logger::init();
    color_backtrace::install();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage:");
        eprintln!("  {} <serial port> <device id> <register>", args[0]);
        exit(1);
    }
    let device = args[2]
        .parse()
        .ok()
        .and_then(DeviceAddress::new)
        .ok_or_else(|| eyre!("Invalid device id {}", args[2]))?;
    let register: RegisterId = args[3]
        .parse()
        .wrap_err_with(|| format!("Invalid register {}", args[3]))?;

    let transport = SerialPortTransport::open(&args[1], DEFAULT_BAUD_RATE)
        .wrap_err_with(|| format!("Failed to open serial port {}", args[1]))?;
    let mut servo = Servo::with_device(transport, device);

    let value = servo.read_register(register)?;
    println!("{} is {} ({:#x})", register, value, value);
    Ok(())
}
