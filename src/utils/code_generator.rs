use rand::RngCore;

pub const COUPON_CODE_PREFIX: &str = "PROMO-";

/// Generates a coupon code: `PROMO-` followed by 4 random bytes as
/// uppercase hex.
pub fn generate_coupon_code() -> String {
    let mut bytes = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
    format!("{COUPON_CODE_PREFIX}{hex}")
}
