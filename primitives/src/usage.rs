//! Usage page / usage ID constants and name lookups.
//!
//! A two-way table: schema authors reach for named constants, and the
//! Analyzer's field-naming pass looks names back up from
//! `(usage_page, usage_id)` pairs.

/// Well-known usage page identifiers (HID Usage Tables 1.12, section 3).
pub mod usage_page {
    pub const UNDEFINED: u16 = 0x00;
    pub const GENERIC_DESKTOP: u16 = 0x01;
    pub const SIMULATION_CONTROLS: u16 = 0x02;
    pub const VR_CONTROLS: u16 = 0x03;
    pub const SPORT_CONTROLS: u16 = 0x04;
    pub const GAME_CONTROLS: u16 = 0x05;
    pub const GENERIC_DEVICE_CONTROLS: u16 = 0x06;
    pub const KEYBOARD: u16 = 0x07;
    pub const LEDS: u16 = 0x08;
    pub const BUTTON: u16 = 0x09;
    pub const ORDINAL: u16 = 0x0A;
    pub const TELEPHONY: u16 = 0x0B;
    pub const CONSUMER: u16 = 0x0C;
    pub const DIGITIZER: u16 = 0x0D;
    pub const ALPHANUMERIC_DISPLAY: u16 = 0x14;
    pub const BARCODE_SCANNER: u16 = 0x8C;
    pub const VENDOR_DEFINED_START: u16 = 0xFF00;
    pub const VENDOR_DEFINED_END: u16 = 0xFFFF;
}

/// Usage IDs on the Generic Desktop page (section 4).
pub mod generic_desktop {
    pub const POINTER: u32 = 0x01;
    pub const MOUSE: u32 = 0x02;
    pub const JOYSTICK: u32 = 0x04;
    pub const GAMEPAD: u32 = 0x05;
    pub const KEYBOARD: u32 = 0x06;
    pub const KEYPAD: u32 = 0x07;
    pub const MULTI_AXIS_CONTROLLER: u32 = 0x08;
    pub const X: u32 = 0x30;
    pub const Y: u32 = 0x31;
    pub const Z: u32 = 0x32;
    pub const RX: u32 = 0x33;
    pub const RY: u32 = 0x34;
    pub const RZ: u32 = 0x35;
    pub const SLIDER: u32 = 0x36;
    pub const DIAL: u32 = 0x37;
    pub const WHEEL: u32 = 0x38;
    pub const HAT_SWITCH: u32 = 0x39;
    pub const SYSTEM_CONTROL: u32 = 0x80;
}

/// Usage IDs on the LED page (section 11).
pub mod led {
    pub const NUM_LOCK: u32 = 0x01;
    pub const CAPS_LOCK: u32 = 0x02;
    pub const SCROLL_LOCK: u32 = 0x03;
    pub const POWER: u32 = 0x06;
    pub const SHIFT: u32 = 0x07;
    pub const MUTE: u32 = 0x09;
    pub const RING: u32 = 0x18;
}

/// Usage IDs on the Consumer page (section 15).
pub mod consumer {
    pub const CONSUMER_CONTROL: u32 = 0x01;
    pub const NUMERIC_KEYPAD: u32 = 0x02;
    pub const PROGRAMMABLE_BUTTONS: u32 = 0x03;
    pub const MICROPHONE: u32 = 0x04;
    pub const HEADPHONE: u32 = 0x05;
    pub const GRAPHIC_EQUALIZER: u32 = 0x06;
    pub const AC_PAN: u32 = 0x0238;
}

/// Returns a human name for a well-known usage page, or `None`.
pub fn usage_page_name(page: u16) -> Option<&'static str> {
    use usage_page::*;
    Some(match page {
        UNDEFINED => "Undefined",
        GENERIC_DESKTOP => "GenericDesktop",
        SIMULATION_CONTROLS => "SimulationControls",
        VR_CONTROLS => "VRControls",
        SPORT_CONTROLS => "SportControls",
        GAME_CONTROLS => "GameControls",
        GENERIC_DEVICE_CONTROLS => "GenericDeviceControls",
        KEYBOARD => "Keyboard",
        LEDS => "LED",
        BUTTON => "Button",
        ORDINAL => "Ordinal",
        TELEPHONY => "Telephony",
        CONSUMER => "Consumer",
        DIGITIZER => "Digitizer",
        ALPHANUMERIC_DISPLAY => "AlphanumericDisplay",
        BARCODE_SCANNER => "BarCodeScanner",
        VENDOR_DEFINED_START..=VENDOR_DEFINED_END => "VendorDefined",
        _ => return None,
    })
}

/// Returns a human name for a `(usage_page, usage_id)` pair, the way the
/// Analyzer's field-naming pass (section 4.4) needs it. The Button page is
/// deliberately excluded: its names (`Button_i`) are index-derived, not
/// table-derived, and are built by the analyzer itself.
pub fn usage_name(page: u16, usage_id: u32) -> Option<&'static str> {
    match page {
        usage_page::GENERIC_DESKTOP => Some(match usage_id {
            generic_desktop::POINTER => "Pointer",
            generic_desktop::MOUSE => "Mouse",
            generic_desktop::JOYSTICK => "Joystick",
            generic_desktop::GAMEPAD => "Gamepad",
            generic_desktop::KEYBOARD => "Keyboard",
            generic_desktop::KEYPAD => "Keypad",
            generic_desktop::MULTI_AXIS_CONTROLLER => "MultiAxisController",
            generic_desktop::X => "X",
            generic_desktop::Y => "Y",
            generic_desktop::Z => "Z",
            generic_desktop::RX => "Rx",
            generic_desktop::RY => "Ry",
            generic_desktop::RZ => "Rz",
            generic_desktop::SLIDER => "Slider",
            generic_desktop::DIAL => "Dial",
            generic_desktop::WHEEL => "Wheel",
            generic_desktop::HAT_SWITCH => "Hat_Switch",
            generic_desktop::SYSTEM_CONTROL => "System_Control",
            _ => return None,
        }),
        usage_page::LEDS => Some(match usage_id {
            led::NUM_LOCK => "Num_Lock",
            led::CAPS_LOCK => "Caps_Lock",
            led::SCROLL_LOCK => "Scroll_Lock",
            led::POWER => "Power",
            led::SHIFT => "Shift",
            led::MUTE => "Mute",
            led::RING => "Ring",
            _ => return None,
        }),
        usage_page::CONSUMER => Some(match usage_id {
            consumer::CONSUMER_CONTROL => "Consumer_Control",
            consumer::NUMERIC_KEYPAD => "Numeric_Keypad",
            consumer::PROGRAMMABLE_BUTTONS => "Programmable_Buttons",
            consumer::MICROPHONE => "Microphone",
            consumer::HEADPHONE => "Headphone",
            consumer::GRAPHIC_EQUALIZER => "Graphic_Equalizer",
            consumer::AC_PAN => "AC_Pan",
            _ => return None,
        }),
        _ => None,
    }
}
