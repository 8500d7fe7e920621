//! Object identifiers of the PACE protocols (BSI TR-03110-3 § A.1.1).


use rasn::types::Oid;


macro_rules! pace_oid {
    ($name:ident $(, $number:expr)* $(,)?) => {
        pub const $name: &'static Oid = Oid::const_new(&[0, 4, 0, 127, 0, 7, 2, 2, 4 $(, $number)*]);
    };
}

pace_oid!(PACE_OID_PREFIX);

pace_oid!(PACE_ECDH_GM,                     2);
pace_oid!(PACE_ECDH_GM_AES_CBC_CMAC_128,    2, 2);


/// Whether `oid` identifies any PACE variant.
pub fn is_pace(oid: &Oid) -> bool {
    oid.starts_with(PACE_OID_PREFIX) && oid.len() > PACE_OID_PREFIX.len()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pace() {
        assert!(is_pace(PACE_ECDH_GM_AES_CBC_CMAC_128));
        assert!(!is_pace(PACE_OID_PREFIX));
        assert!(!is_pace(Oid::const_new(&[0, 4, 0, 127, 0, 7, 2, 2, 3, 2])));
    }
}
