/// Apply the default `tcp://` scheme when the address carries none.
///
/// `tcp://`, `ssl://` and `socks://` qualified addresses pass through
/// untouched.
#[must_use]
pub fn prepare_address(address: &str) -> String {
    let schemes = ["tcp://", "ssl://", "socks://"];
    if schemes.iter().any(|scheme| address.starts_with(scheme)) {
        address.to_string()
    } else {
        format!("tcp://{}", address)
    }
}
