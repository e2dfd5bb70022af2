#![no_main]

use libfuzzer_sys::fuzz_target;

use mparith_core::MpInt;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(x) = text.parse::<MpInt>() {
        let printed = x.to_string();
        assert_eq!(printed.parse::<MpInt>().unwrap(), x);
        assert_eq!(MpInt::from_hex_str(&x.to_hex_string()).unwrap(), x);
    }
    let _ = MpInt::from_hex_str(text);
});
