use lvserial::codec;
use lvserial::frame::{Access, Frame};
use lvserial::{DeviceAddress, Error, ErrorKind, ErrorType, RegisterId, Servo, Transport};
use std::collections::HashMap;
use std::time::Duration;

/// Pretends to be a servo at the other end of the line: parses each request and answers it the way
/// the firmware does.
struct SimulatedServo {
    device: DeviceAddress,
    registers: HashMap<RegisterId, u32>,
    incoming: Vec<u8>,
    outgoing: Vec<u8>,
    /// Every frame seen on the line, whoever it was for.
    frames: Vec<Frame>,
}

impl SimulatedServo {
    fn new(device: u8) -> Self {
        let mut registers = HashMap::new();
        registers.insert(RegisterId::SysPn, 0x1234);
        registers.insert(RegisterId::SysUid, 0x0abc_def0);
        Self {
            device: DeviceAddress::new(device).unwrap(),
            registers,
            incoming: vec![],
            outgoing: vec![],
            frames: vec![],
        }
    }

    fn handle(&mut self, frame: Frame) {
        self.frames.push(frame);
        if frame.device != self.device {
            return;
        }
        let spec = frame.register.spec();
        if frame.access == Access::Write {
            self.registers.insert(frame.register, frame.value);
        }
        let value = self.registers.get(&frame.register).copied().unwrap_or(0);
        self.outgoing.extend(codec::encode(value, spec.width));
    }
}

impl ErrorType for SimulatedServo {
    type Error = ErrorKind;
}

impl Transport for SimulatedServo {
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.outgoing.clear();
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.incoming.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        match Frame::parse(&self.incoming) {
            Ok(frame) => {
                self.incoming.clear();
                self.handle(frame);
                Ok(())
            }
            Err(nb::Error::WouldBlock) => Ok(()),
            Err(nb::Error::Other(_)) => Err(ErrorKind::InvalidData),
        }
    }

    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, Self::Error> {
        let count = buf.len().min(self.outgoing.len());
        buf[..count].copy_from_slice(&self.outgoing[..count]);
        self.outgoing.drain(..count);
        Ok(count)
    }
}

#[test]
fn init_and_move() {
    let mut line = SimulatedServo::new(3);
    let mut servo = Servo::new(&mut line);

    assert_eq!(servo.init(DeviceAddress::new(3)), Ok(0x1234));
    servo.power_on().unwrap();
    servo.write_target_pos(1000).unwrap();
    assert_eq!(servo.read_register(RegisterId::FbTpos), Ok(1000));
    assert_eq!(servo.read_register(RegisterId::SysUid), Ok(0x0abc_def0));

    assert_eq!(line.registers[&RegisterId::SysUlk], 0x55);
    assert_eq!(line.registers[&RegisterId::PwmEn], 1);
    assert!(line.incoming.is_empty());
    assert_eq!(line.frames.len(), 6);
}

#[test]
fn wrong_device_times_out() {
    let mut line = SimulatedServo::new(3);
    let mut servo = Servo::new(&mut line);

    assert_eq!(
        servo.ping(),
        Err(Error::TimedOut {
            register: RegisterId::SysPn,
            expected: 2,
            received: 0
        })
    );
    servo.set_device(DeviceAddress::new(3).unwrap());
    assert_eq!(servo.ping(), Ok(0x1234));
}

#[test]
fn values_are_truncated_not_rejected() {
    let mut line = SimulatedServo::new(0);
    let mut servo = Servo::new(&mut line);

    servo.write_register(RegisterId::FbTpos, 0xffff).unwrap();
    servo.write_register(RegisterId::SysSid, 0x85).unwrap();
    assert_eq!(servo.read_register(RegisterId::FbTpos), Ok(0x3fff));
    assert_eq!(servo.read_register(RegisterId::SysSid), Ok(0x05));
}

#[test]
fn signed_readings() {
    let mut line = SimulatedServo::new(0);
    line.registers.insert(RegisterId::MSpd, 0x3f00);
    line.registers.insert(RegisterId::MVe, 0x0800);
    line.registers.insert(RegisterId::MVi, 4096);
    let mut servo = Servo::new(&mut line);

    assert_eq!(servo.read_now_speed(), Ok(-256));
    assert_eq!(servo.read_back_emf(), Ok(13.75));
    assert_eq!(servo.read_power_voltage(), Ok(27.5));
}

#[test]
fn read_only_registers_never_reach_the_line() {
    let mut line = SimulatedServo::new(0);
    let mut servo = Servo::new(&mut line);

    for &register in RegisterId::ALL {
        if !register.spec().writable {
            assert_eq!(
                servo.write_register(register, 1),
                Err(Error::ReadOnly(register))
            );
        }
    }
    assert!(line.frames.is_empty());
}
