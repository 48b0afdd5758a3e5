//! Phantom S991 model integration tests.
//!
//! Exercises the built-in model end to end: codec round trips per base
//! type, enum fallback, shared-word fields over a simulated bus, sealing,
//! and repeatable enumeration.

use cxp_regmap::codec;
use cxp_regmap::prelude::*;

/// Simulated device memory covering the manufacturer register space.
fn simulated_camera() -> RegisterDevice<MemoryBus> {
    let map = phantom_s991().expect("built-in model");
    RegisterDevice::new(map, MemoryBus::new(0x8000, 0x400))
}

/// A representative valid value for a writable descriptor.
fn sample_value(desc: &RegisterDescriptor) -> RegisterValue {
    match desc.base {
        BaseType::UIntBE => match desc.enum_table.as_ref().and_then(|t| t.iter().last()) {
            Some((_, label)) => RegisterValue::label(label),
            None => RegisterValue::UInt(desc.max_raw() / 3),
        },
        BaseType::FloatBE => RegisterValue::Float(1234.5),
        BaseType::String => RegisterValue::text("10.0.0.2"),
    }
}

#[test]
fn test_round_trip_every_read_write_register() {
    let map = phantom_s991().unwrap();
    let mut checked = 0;
    for desc in map.enumerate() {
        if desc.mode != AccessMode::RW {
            continue;
        }
        let value = sample_value(desc);
        let current = vec![0u8; desc.span_bytes()];
        let raw = codec::encode(desc, &value, Some(&current)).unwrap();
        assert_eq!(raw.len(), desc.span_bytes(), "{}", desc.name);
        assert_eq!(codec::decode(desc, &raw).unwrap(), value, "{}", desc.name);
        checked += 1;
    }
    assert!(checked > 30);
}

#[test]
fn test_labelled_integer_decodes_to_label() {
    let map = phantom_s991().unwrap();
    let current = [0u8; 4];

    let raw = map
        .encode("CTRLReg_fan", &RegisterValue::UInt(1), Some(&current))
        .unwrap();
    assert_eq!(raw, vec![0x00, 0x00, 0x01, 0x00]);
    assert_eq!(
        map.decode("CTRLReg_fan", &raw).unwrap(),
        RegisterValue::label("FanOn")
    );

    // Same bytes as the label encodes to.
    let by_label = map
        .encode("CTRLReg_fan", &RegisterValue::label("FanOn"), Some(&current))
        .unwrap();
    assert_eq!(by_label, raw);

    // Unmapped integers come back as integers.
    let raw = map
        .encode("CTRLReg_fan", &RegisterValue::UInt(7), Some(&current))
        .unwrap();
    assert_eq!(map.decode("CTRLReg_fan", &raw).unwrap(), RegisterValue::UInt(7));
}

#[test]
fn test_width_scenario() {
    let map = phantom_s991().unwrap();
    let raw = map.encode("WidthReg", &RegisterValue::UInt(1920), None).unwrap();
    assert_eq!(raw, vec![0x00, 0x00, 0x07, 0x80]);
    assert_eq!(
        map.decode("WidthReg", &[0x00, 0x00, 0x07, 0x80]).unwrap(),
        RegisterValue::UInt(1920)
    );
}

#[test]
fn test_pixel_format_scenario() {
    let map = phantom_s991().unwrap();
    assert_eq!(
        map.decode("PixelFormatReg", &[0x01, 0x08, 0x00, 0x01]).unwrap(),
        RegisterValue::label("Mono8")
    );
    let raw = map
        .encode("PixelFormatReg", &RegisterValue::label("Mono8"), None)
        .unwrap();
    assert_eq!(
        map.decode("PixelFormatReg", &raw).unwrap(),
        RegisterValue::label("Mono8")
    );
    // Raw value with no label falls back to the integer.
    assert_eq!(
        map.decode("PixelFormatReg", &[0x02, 0x18, 0x00, 0x14]).unwrap(),
        RegisterValue::UInt(0x02180014)
    );
}

#[test]
fn test_string_register_boundaries() {
    let map = phantom_s991().unwrap();
    // DeviceIPAddress is read-only on the device; use its layout with RW access.
    let mut desc = map.lookup("DeviceIPAddress").unwrap().clone();
    desc.mode = AccessMode::RW;

    let exact = "a".repeat(32);
    let raw = codec::encode(&desc, &RegisterValue::text(exact.clone()), None).unwrap();
    assert_eq!(codec::decode(&desc, &raw).unwrap(), RegisterValue::text(exact));

    let err = codec::encode(&desc, &RegisterValue::text("a".repeat(33)), None).unwrap_err();
    assert!(matches!(err, RegisterError::StringTooLong { len: 33, max: 32, .. }));
}

#[test]
fn test_access_modes() {
    let map = phantom_s991().unwrap();
    assert!(matches!(
        map.encode("WidthMaxReg", &RegisterValue::UInt(4096), None),
        Err(RegisterError::WriteNotPermitted { .. })
    ));
    assert!(matches!(
        map.decode("TimeStampSetReg", &[0, 0, 0, 0]),
        Err(RegisterError::ReadNotPermitted { .. })
    ));
}

#[test]
fn test_trigger_word_fields_are_independent() {
    let mut cam = simulated_camera();
    cam.set("TriggerModeReg", &RegisterValue::label("TriggerModeOn")).unwrap();
    cam.set("TriggerSelectorReg", &RegisterValue::label("ExposureActive"))
        .unwrap();
    cam.set("TriggerSourceReg", &RegisterValue::label("SWTRIGGER")).unwrap();

    assert_eq!(cam.bus().peek(0x8128, 4).unwrap(), &[0x00, 0x05, 0x01, 0x01]);
    assert_eq!(cam.get("TriggerModeReg").unwrap(), RegisterValue::label("TriggerModeOn"));
    assert_eq!(
        cam.get("TriggerSelectorReg").unwrap(),
        RegisterValue::label("ExposureActive")
    );

    cam.set("TriggerModeReg", &RegisterValue::label("TriggerModeOff")).unwrap();
    assert_eq!(cam.bus().peek(0x8128, 4).unwrap(), &[0x00, 0x05, 0x01, 0x00]);
    assert_eq!(cam.get("TriggerSourceReg").unwrap(), RegisterValue::label("SWTRIGGER"));
}

#[test]
fn test_gpio_lines_share_a_word() {
    let mut cam = simulated_camera();
    cam.set("DigitalIOReg[0]", &RegisterValue::label("strobe")).unwrap();
    cam.set("DigitalIOReg[1]", &RegisterValue::label("userin")).unwrap();
    cam.set("DigitalIOReg[2]", &RegisterValue::label("userout")).unwrap();
    assert_eq!(cam.bus().peek(0x8198, 4).unwrap(), &[0x00, 31, 6, 16]);
}

#[test]
fn test_temperature_readout() {
    let mut cam = simulated_camera();
    cam.set("pDeviceTemperatureSelectorReg", &RegisterValue::UInt(1)).unwrap();
    // Sensor updates the upper half on its own.
    let word = cam.bus().peek(0x8168, 4).unwrap().to_vec();
    cam.bus_mut()
        .poke(0x8168, &[word[0], word[1], 0x00, 0x2D])
        .unwrap();

    assert_eq!(cam.get("pDeviceTemperatureReg").unwrap(), RegisterValue::UInt(45));
    assert_eq!(
        cam.get("pDeviceTemperatureSelectorReg").unwrap(),
        RegisterValue::UInt(1)
    );
}

#[test]
fn test_float_registers() {
    let mut cam = simulated_camera();
    cam.set("pFrameRateReg", &RegisterValue::Float(1000.0)).unwrap();
    assert_eq!(cam.bus().peek(0x80C0, 4).unwrap(), &1000.0f32.to_be_bytes());
    assert_eq!(cam.get("pFrameRateReg").unwrap(), RegisterValue::Float(1000.0));
    assert!(matches!(
        cam.set("ExposureTimeReg", &RegisterValue::UInt(10)),
        Err(DeviceError::Register(RegisterError::ValueTypeMismatch { .. }))
    ));
}

#[test]
fn test_model_is_sealed_after_use() {
    let mut map = phantom_s991().unwrap();
    assert!(!map.is_sealed());
    let _ = map.lookup("GainReg").unwrap();
    let err = map
        .register(RegisterDescriptor::new("ExtraReg", BaseType::UIntBE, 0x9000))
        .unwrap_err();
    assert!(matches!(err, RegisterError::Sealed { .. }));
    assert_eq!(map.len(), 57);
}

#[test]
fn test_enumerate_repeatable() {
    let map = phantom_s991().unwrap();
    let first: Vec<RegisterDescriptor> = map.enumerate().cloned().collect();
    let second: Vec<RegisterDescriptor> = map.enumerate().cloned().collect();
    assert_eq!(first.len(), 57);
    assert_eq!(first, second);
}
