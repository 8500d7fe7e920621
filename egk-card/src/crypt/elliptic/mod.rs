//! Elliptic-curve cryptography over prime fields.


pub mod curves;


use std::ops::{Add, Mul};

use crypto_bigint::{BoxedUint, Integer};
use crypto_bigint::modular::{BoxedMontyForm, BoxedMontyParams};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroizing;
use zeroize_derive::ZeroizeOnDrop;

use crate::crypt::{boxed_uint_from_be_slice, to_fixed_be_bytes};


/// Marks an uncompressed point encoding.
const UNCOMPRESSED_POINT: u8 = 0x04;


/// A point in affine coordinates.
///
/// Both coordinates carry the bit precision of the prime of the curve they belong to.
#[derive(Clone, Debug, Eq, PartialEq, ZeroizeOnDrop)]
pub struct AffinePoint {
    x: BoxedUint,
    y: BoxedUint,
}
impl AffinePoint {
    pub(crate) const fn new(x: BoxedUint, y: BoxedUint) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> &BoxedUint { &self.x }
    pub fn y(&self) -> &BoxedUint { &self.y }
}


/// A point in projective coordinates in Montgomery form.
#[derive(Clone, Debug, Eq, PartialEq)]
struct MontyProjectivePoint {
    x: BoxedMontyForm,
    y: BoxedMontyForm,
    z: BoxedMontyForm,
}

#[derive(Clone, Debug)]
struct MontyKnowledge {
    params: BoxedMontyParams,
    a: BoxedMontyForm,
    b: BoxedMontyForm,
}

/// An elliptic curve of the form `y**2 ≡ x**3 + ax + b` modulo a prime number.
///
/// Only curves with cofactor 1 are supported.
#[derive(Clone, Debug)]
pub struct PrimeWeierstrassCurve {
    /// The prime (modulus) of the curve.
    prime: BoxedUint,

    /// Coefficient `a` in the curve's formula.
    coefficient_a: BoxedUint,

    /// Coefficient `b` in the curve's formula.
    coefficient_b: BoxedUint,

    /// The coordinates of the generator point of the curve.
    generator: AffinePoint,

    monty: MontyKnowledge,
}
impl PrimeWeierstrassCurve {
    /// Assembles a curve from its big-endian encoded parameters.
    ///
    /// Returns `None` if the prime is even, a parameter is larger than the prime or the generator
    /// is not on the curve.
    pub fn new(
        prime: &[u8],
        coefficient_a: &[u8],
        coefficient_b: &[u8],
        generator_x: &[u8],
        generator_y: &[u8],
    ) -> Option<Self> {
        let bits: u32 = (8 * prime.len()).try_into().ok()?;
        let prime = boxed_uint_from_be_slice(prime, bits)?;
        let bits = prime.bits_precision();

        let odd_prime = prime.to_odd().into_option()?;
        let params = BoxedMontyParams::new(odd_prime);

        let coefficient_a = boxed_uint_from_be_slice(coefficient_a, bits)?;
        let coefficient_b = boxed_uint_from_be_slice(coefficient_b, bits)?;
        let generator = AffinePoint::new(
            boxed_uint_from_be_slice(generator_x, bits)?,
            boxed_uint_from_be_slice(generator_y, bits)?,
        );
        for value in [&coefficient_a, &coefficient_b, &generator.x, &generator.y] {
            if value >= &prime {
                return None;
            }
        }

        let monty = MontyKnowledge {
            a: BoxedMontyForm::new(coefficient_a.clone(), params.clone()),
            b: BoxedMontyForm::new(coefficient_b.clone(), params.clone()),
            params,
        };
        let curve = Self {
            prime,
            coefficient_a,
            coefficient_b,
            generator,
            monty,
        };
        if !curve.is_on_curve(&curve.generator) {
            return None;
        }
        Some(curve)
    }

    pub fn prime(&self) -> &BoxedUint { &self.prime }
    pub fn coefficient_a(&self) -> &BoxedUint { &self.coefficient_a }
    pub fn coefficient_b(&self) -> &BoxedUint { &self.coefficient_b }
    pub fn generator(&self) -> &AffinePoint { &self.generator }

    /// The number of bytes of an encoded field element; also the length of a private key.
    pub fn field_size_bytes(&self) -> usize {
        usize::try_from(self.prime.bits().div_ceil(8))
            .unwrap_or(usize::MAX)
    }

    /// Decodes a private key or other scalar with the precision of this curve.
    pub fn scalar_from_be_slice(&self, bytes: &[u8]) -> Option<Zeroizing<BoxedUint>> {
        let bits: u32 = (8 * bytes.len()).try_into().ok()?;
        let bits = bits.max(self.prime.bits_precision());
        boxed_uint_from_be_slice(bytes, bits)
            .map(Zeroizing::new)
    }

    /// Encodes a point on this curve in uncompressed form.
    pub fn encode_point(&self, point: &AffinePoint) -> Option<Zeroizing<Vec<u8>>> {
        let coordinate_length = self.field_size_bytes();
        let x_bytes = to_fixed_be_bytes(&point.x, coordinate_length)?;
        let y_bytes = to_fixed_be_bytes(&point.y, coordinate_length)?;

        let mut ret = Zeroizing::new(Vec::with_capacity(1 + 2*coordinate_length));
        ret.push(UNCOMPRESSED_POINT);
        ret.extend(x_bytes.iter());
        ret.extend(y_bytes.iter());
        Some(ret)
    }

    /// Decodes an uncompressed point and verifies that it is on this curve.
    pub fn decode_point(&self, bytes: &[u8]) -> Option<AffinePoint> {
        let coordinate_length = self.field_size_bytes();
        if bytes.len() != 1 + 2*coordinate_length {
            return None;
        }
        if bytes[0] != UNCOMPRESSED_POINT {
            // compressed points are not supported
            return None;
        }

        let bits = self.prime.bits_precision();
        let x = boxed_uint_from_be_slice(&bytes[1..1+coordinate_length], bits)?;
        let y = boxed_uint_from_be_slice(&bytes[1+coordinate_length..], bits)?;
        if x >= self.prime || y >= self.prime {
            return None;
        }

        let point = AffinePoint::new(x, y);
        if self.is_on_curve(&point) {
            Some(point)
        } else {
            None
        }
    }

    fn internal_is_on_curve(monty: &MontyKnowledge, point: &MontyProjectivePoint) -> Choice {
        let inverse_option = point.z.invert();
        let inverse_alternative = point.z.clone();
        let inverse = inverse_option.clone().into_option().unwrap_or(inverse_alternative);

        let x = (&point.x).mul(&inverse);
        let y = (&point.y).mul(&inverse);

        let y_squared = (&y).mul(&y);
        let x_cubed = (&x).mul(&x).mul(&x);
        let ax = (&x).mul(&monty.a);
        let rhs = (&x_cubed).add(&ax).add(&monty.b);
        let are_equal = y_squared.retrieve().ct_eq(&rhs.retrieve());
        Choice::conditional_select(&Choice::from(0), &are_equal, inverse_option.is_some())
    }

    fn internal_affine_to_monty_projective(monty: &MontyKnowledge, point: &AffinePoint) -> MontyProjectivePoint {
        let x = BoxedMontyForm::new(point.x.clone(), monty.params.clone());
        let y = BoxedMontyForm::new(point.y.clone(), monty.params.clone());
        let z = BoxedMontyForm::one(monty.params.clone());
        MontyProjectivePoint { x, y, z }
    }

    fn internal_monty_projective_to_affine(point: &MontyProjectivePoint) -> CtOption<AffinePoint> {
        let inverse_option = point.z.invert();
        let inverse_alternative = point.z.clone();
        let inverse = inverse_option.clone().into_option().unwrap_or(inverse_alternative);

        let x = (&point.x).mul(&inverse);
        let y = (&point.y).mul(&inverse);

        CtOption::new(AffinePoint::new(x.retrieve(), y.retrieve()), inverse_option.is_some())
    }

    fn internal_double_point(monty: &MontyKnowledge, point: &MontyProjectivePoint) -> MontyProjectivePoint {
        // Renes/Costello/Batina 2015 (https://eprint.iacr.org/2015/1060), Algorithm 3
        let b3 = (&monty.b).add(&monty.b).add(&monty.b);

        // 1. t0 ← X · X
        let mut t0 = (&point.x).mul(&point.x);
        // 2. t1 ← Y · Y
        let t1 = (&point.y).mul(&point.y);
        // 3. t2 ← Z · Z
        let mut t2 = (&point.z).mul(&point.z);
        // 4. t3 ← X · Y
        let mut t3 = (&point.x).mul(&point.y);
        // 5. t3 ← t3 + t3
        t3 = (&t3).add(&t3);
        // 6. Z3 ← X · Z
        let mut z3 = (&point.x).mul(&point.z);
        // 7. Z3 ← Z3 + Z3
        z3 = (&z3).add(&z3);
        // 8. X3 ← a · Z3
        let mut x3 = (&monty.a).mul(&z3);
        // 9. Y3 ← b3 · t2
        let mut y3 = (&b3).mul(&t2);
        // 10. Y3 ← X3 + Y3
        y3 = (&x3).add(&y3);
        // 11. X3 ← t1 − Y3
        x3 = (&t1).sub(&y3);
        // 12. Y3 ← t1 + Y3
        y3 = (&t1).add(&y3);
        // 13. Y3 ← X3 · Y3
        y3 = (&x3).mul(&y3);
        // 14. X3 ← t3 · X3
        x3 = (&t3).mul(&x3);
        // 15. Z3 ← b3 · Z3
        z3 = (&b3).mul(&z3);
        // 16. t2 ← a · t2
        t2 = (&monty.a).mul(&t2);
        // 17. t3 ← t0 − t2
        t3 = (&t0).sub(&t2);
        // 18. t3 ← a · t3
        t3 = (&monty.a).mul(&t3);
        // 19. t3 ← t3 + Z3
        t3 = (&t3).add(&z3);
        // 20. Z3 ← t0 + t0
        z3 = (&t0).add(&t0);
        // 21. t0 ← Z3 + t0
        t0 = (&z3).add(&t0);
        // 22. t0 ← t0 + t2
        t0 = (&t0).add(&t2);
        // 23. t0 ← t0 · t3
        t0 = (&t0).mul(&t3);
        // 24. Y3 ← Y3 + t0
        y3 = (&y3).add(&t0);
        // 25. t2 ← Y · Z
        t2 = (&point.y).mul(&point.z);
        // 26. t2 ← t2 + t2
        t2 = (&t2).add(&t2);
        // 27. t0 ← t2 · t3
        t0 = (&t2).mul(&t3);
        // 28. X3 ← X3 − t0
        x3 = (&x3).sub(&t0);
        // 29. Z3 ← t2 · t1
        z3 = (&t2).mul(&t1);
        // 30. Z3 ← Z3 + Z3
        z3 = (&z3).add(&z3);
        // 31. Z3 ← Z3 + Z3
        z3 = (&z3).add(&z3);
        MontyProjectivePoint { x: x3, y: y3, z: z3 }
    }

    fn internal_add_points(monty: &MontyKnowledge, lhs: &MontyProjectivePoint, rhs: &MontyProjectivePoint) -> MontyProjectivePoint {
        // Renes/Costello/Batina 2015 (https://eprint.iacr.org/2015/1060), Algorithm 1
        let b3 = (&monty.b).add(&monty.b).add(&monty.b);

        // 1. t0 ← X1 · X2
        let mut t0 = (&lhs.x).mul(&rhs.x);
        // 2. t1 ← Y1 · Y2
        let mut t1 = (&lhs.y).mul(&rhs.y);
        // 3. t2 ← Z1 · Z2
        let mut t2 = (&lhs.z).mul(&rhs.z);
        // 4. t3 ← X1 + Y1
        let mut t3 = (&lhs.x).add(&lhs.y);
        // 5. t4 ← X2 + Y2
        let mut t4 = (&rhs.x).add(&rhs.y);
        // 6. t3 ← t3 · t4
        t3 = (&t3).mul(&t4);
        // 7. t4 ← t0 + t1
        t4 = (&t0).add(&t1);
        // 8. t3 ← t3 − t4
        t3 = (&t3).sub(&t4);
        // 9. t4 ← X1 + Z1
        t4 = (&lhs.x).add(&lhs.z);
        // 10. t5 ← X2 + Z2
        let mut t5 = (&rhs.x).add(&rhs.z);
        // 11. t4 ← t4 · t5
        t4 = (&t4).mul(&t5);
        // 12. t5 ← t0 + t2
        t5 = (&t0).add(&t2);
        // 13. t4 ← t4 − t5
        t4 = (&t4).sub(&t5);
        // 14. t5 ← Y1 + Z1
        t5 = (&lhs.y).add(&lhs.z);
        // 15. X3 ← Y2 + Z2
        let mut x3 = (&rhs.y).add(&rhs.z);
        // 16. t5 ← t5 · X3
        t5 = (&t5).mul(&x3);
        // 17. X3 ← t1 + t2
        x3 = (&t1).add(&t2);
        // 18. t5 ← t5 − X3
        t5 = (&t5).sub(&x3);
        // 19. Z3 ← a · t4
        let mut z3 = (&monty.a).mul(&t4);
        // 20. X3 ← b3 · t2
        x3 = (&b3).mul(&t2);
        // 21. Z3 ← X3 + Z3
        z3 = (&x3).add(&z3);
        // 22. X3 ← t1 − Z3
        x3 = (&t1).sub(&z3);
        // 23. Z3 ← t1 + Z3
        z3 = (&t1).add(&z3);
        // 24. Y3 ← X3 · Z3
        let mut y3 = (&x3).mul(&z3);
        // 25. t1 ← t0 + t0
        t1 = (&t0).add(&t0);
        // 26. t1 ← t1 + t0
        t1 = (&t1).add(&t0);
        // 27. t2 ← a · t2
        t2 = (&monty.a).mul(&t2);
        // 28. t4 ← b3 · t4
        t4 = (&b3).mul(&t4);
        // 29. t1 ← t1 + t2
        t1 = (&t1).add(&t2);
        // 30. t2 ← t0 − t2
        t2 = (&t0).sub(&t2);
        // 31. t2 ← a · t2
        t2 = (&monty.a).mul(&t2);
        // 32. t4 ← t4 + t2
        t4 = (&t4).add(&t2);
        // 33. t0 ← t1 · t4
        t0 = (&t1).mul(&t4);
        // 34. Y3 ← Y3 + t0
        y3 = (&y3).add(&t0);
        // 35. t0 ← t5 · t4
        t0 = (&t5).mul(&t4);
        // 36. X3 ← t3 · X3
        x3 = (&t3).mul(&x3);
        // 37. X3 ← X3 − t0
        x3 = (&x3).sub(&t0);
        // 38. t0 ← t3 · t1
        t0 = (&t3).mul(&t1);
        // 39. Z3 ← t5 · Z3
        z3 = (&t5).mul(&z3);
        // 40. Z3 ← Z3 + t0
        z3 = (&z3).add(&t0);
        MontyProjectivePoint { x: x3, y: y3, z: z3 }
    }

    fn internal_point_at_infinity(monty: &MontyKnowledge) -> MontyProjectivePoint {
        let x = BoxedMontyForm::zero(monty.params.clone());
        let y = BoxedMontyForm::one(monty.params.clone());
        let z = BoxedMontyForm::zero(monty.params.clone());
        MontyProjectivePoint { x, y, z }
    }

    fn internal_multiply_scalar_with_point(monty: &MontyKnowledge, scalar: &BoxedUint, point: &MontyProjectivePoint) -> MontyProjectivePoint {
        let mut result = Self::internal_point_at_infinity(monty);

        if bool::from(scalar.is_zero()) {
            return result;
        }

        let mut double_me = point.clone();
        for i in 0..scalar.bits() {
            let sum = Self::internal_add_points(monty, &result, &double_me);
            result = if bool::from(scalar.bit(i)) { sum } else { result };
            double_me = Self::internal_double_point(monty, &double_me);
        }

        debug_assert!(bool::from(Self::internal_is_on_curve(monty, &result)) || bool::from(result.z.retrieve().is_zero()));

        result
    }

    /// Whether the given point is on this curve.
    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        let projective = Self::internal_affine_to_monty_projective(&self.monty, point);
        bool::from(Self::internal_is_on_curve(&self.monty, &projective))
    }

    /// Multiplies a point on the curve by a scalar.
    ///
    /// Returns `None` if the point is not on the curve or the product is the point at infinity.
    pub fn multiply(&self, scalar: &BoxedUint, point: &AffinePoint) -> Option<AffinePoint> {
        let projective = Self::internal_affine_to_monty_projective(&self.monty, point);
        if !bool::from(Self::internal_is_on_curve(&self.monty, &projective)) {
            return None;
        }
        let product = Self::internal_multiply_scalar_with_point(&self.monty, scalar, &projective);
        Self::internal_monty_projective_to_affine(&product).into_option()
    }

    /// Calculates a public key from a private key.
    pub fn calculate_public_key(&self, private_key: &BoxedUint) -> Option<AffinePoint> {
        // public_key = private_key * generator
        self.multiply(private_key, &self.generator)
    }

    /// Calculates the shared point from a private key and the other party's public key.
    ///
    /// Returns `None` if the other public key is not on the curve.
    pub fn diffie_hellman(&self, private_key: &BoxedUint, other_public_key: &AffinePoint) -> Option<AffinePoint> {
        // shared_point = private_key * other_public_key
        self.multiply(private_key, other_public_key)
    }

    /// Derives the curve for the second key agreement of PACE generic mapping.
    ///
    /// The derived curve has the same parameters; its generator is
    /// `nonce * original_generator + shared_point`.
    pub fn derive_generic_mapping_session_curve(&self, nonce: &BoxedUint, shared_point: &AffinePoint) -> Option<Self> {
        let generator_proj = Self::internal_affine_to_monty_projective(&self.monty, &self.generator);
        let shared_point_proj = Self::internal_affine_to_monty_projective(&self.monty, shared_point);
        if !bool::from(Self::internal_is_on_curve(&self.monty, &shared_point_proj)) {
            return None;
        }

        let product = Self::internal_multiply_scalar_with_point(&self.monty, nonce, &generator_proj);
        let sum = Self::internal_add_points(&self.monty, &product, &shared_point_proj);
        let new_generator = Self::internal_monty_projective_to_affine(&sum).into_option()?;

        Some(Self {
            prime: self.prime.clone(),
            coefficient_a: self.coefficient_a.clone(),
            coefficient_b: self.coefficient_b.clone(),
            generator: new_generator,
            monty: self.monty.clone(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::PrimeWeierstrassCurve;
    use super::curves::brainpool_p256r1;
    use crypto_bigint::BoxedUint;
    use hex_literal::hex;

    fn uint(slice: &[u8]) -> BoxedUint {
        BoxedUint::from_be_slice(slice, 256).unwrap()
    }

    #[test]
    fn icao_doc9303_part11_secg1_example() {
        // elliptic-curve Diffie-Hellman with generic mapping
        // the curve is Brainpool p256r1
        let curve = brainpool_p256r1().unwrap();

        // obtain nonce
        let nonce = BoxedUint::from_be_slice(&hex!("
            3F00C4D3 9D153F2B 2A214A07 8D899B22
        "), 128).unwrap();

        // perform key agreement for session secret
        let terminal_private = uint(&hex!("
            7F4EF07B 9EA82FD7 8AD689B3 8D0BC78C
            F21F249D 953BC46F 4C6E1925 9C010F99
        "));
        let chip_private = uint(&hex!("
            498FF497 56F2DC15 87840041 839A8598
            2BE7761D 14715FB0 91EFA7BC E9058560
        "));

        let terminal_public = curve.calculate_public_key(&terminal_private).unwrap();
        let chip_public = curve.calculate_public_key(&chip_private).unwrap();

        assert_eq!(
            terminal_public.x(),
            &uint(&hex!("
                7ACF3EFC 982EC455 65A4B155 129EFBC7
                4650DCBF A6362D89 6FC70262 E0C2CC5E
            ")),
        );
        assert_eq!(
            terminal_public.y(),
            &uint(&hex!("
                544552DC B6725218 799115B5 5C9BAA6D
                9F6BC3A9 618E70C2 5AF71777 A9C4922D
            ")),
        );
        assert_eq!(
            chip_public.x(),
            &uint(&hex!("
                824FBA91 C9CBE26B EF53A0EB E7342A3B
                F178CEA9 F45DE0B7 0AA60165 1FBA3F57
            ")),
        );
        assert_eq!(
            chip_public.y(),
            &uint(&hex!("
                30D8C879 AAA9C9F7 3991E61B 58F4D52E
                B87A0A0C 709A49DC 63719363 CCD13C54
            ")),
        );

        let terminal_secret = curve.diffie_hellman(&terminal_private, &chip_public).unwrap();
        let chip_secret = curve.diffie_hellman(&chip_private, &terminal_public).unwrap();
        assert_eq!(terminal_secret, chip_secret);
        assert_eq!(
            terminal_secret.x(),
            &uint(&hex!("
                60332EF2 450B5D24 7EF6D386 8397D398
                852ED6E8 CAF6FFEE F6BF85CA 57057FD5
            ")),
        );
        assert_eq!(
            terminal_secret.y(),
            &uint(&hex!("
                0840CA74 15BAF3E4 3BD414D3 5AA4608B
                93A2CAF3 A4E3EA4E 82C9C13D 03EB7181
            ")),
        );

        // map a new generator:
        // (nonce * original_generator) + shared_secret
        let session_curve = curve.derive_generic_mapping_session_curve(&nonce, &terminal_secret).unwrap();
        assert_eq!(
            session_curve.generator().x(),
            &uint(&hex!("
                8CED63C9 1426D4F0 EB1435E7 CB1D74A4
                6723A0AF 21C89634 F65A9AE8 7A9265E2
            ")),
        );
        assert_eq!(
            session_curve.generator().y(),
            &uint(&hex!("
                8C879506 743F8611 AC33645C 5B985C80
                B5F09A0B 83407C1B 6A4D857A E76FE522
            ")),
        );

        let session_terminal_private = uint(&hex!("
            A73FB703 AC1436A1 8E0CFA5A BB3F7BEC
            7A070E7A 6788486B EE230C4A 22762595
        "));
        let session_chip_private = uint(&hex!("
            107CF586 96EF6155 053340FD 633392BA
            81909DF7 B9706F22 6F32086C 7AFF974A
        "));

        let session_terminal_public = session_curve.calculate_public_key(&session_terminal_private).unwrap();
        let session_chip_public = session_curve.calculate_public_key(&session_chip_private).unwrap();

        assert_eq!(
            session_terminal_public.x(),
            &uint(&hex!("
                2DB7A64C 0355044E C9DF1905 14C625CB
                A2CEA487 54887122 F3A5EF0D 5EDD301C
            ")),
        );
        assert_eq!(
            session_chip_public.x(),
            &uint(&hex!("
                9E880F84 2905B8B3 181F7AF7 CAA9F0EF
                B743847F 44A306D2 D28C1D9E C65DF6DB
            ")),
        );
        assert_eq!(
            session_chip_public.y(),
            &uint(&hex!("
                7764B222 77A2EDDC 3C265A9F 018F9CB8
                52E111B7 68B32690 4B59A019 3776F094
            ")),
        );

        let session_terminal_secret = session_curve.diffie_hellman(&session_terminal_private, &session_chip_public).unwrap();
        let session_chip_secret = session_curve.diffie_hellman(&session_chip_private, &session_terminal_public).unwrap();
        let session_shared_secret = uint(&hex!("
            28768D20 701247DA E81804C9 E780EDE5
            82A9996D B4A31502 0B273319 7DB84925
        "));
        assert_eq!(session_terminal_secret.x(), &session_shared_secret);
        assert_eq!(session_chip_secret.x(), &session_shared_secret);
    }

    #[test]
    fn test_point_encoding() {
        let curve = brainpool_p256r1().unwrap();
        let encoded = curve.encode_point(curve.generator()).unwrap();
        assert_eq!(encoded.len(), 65);
        assert_eq!(&encoded[..], &hex!("
            04
            8BD2AEB9 CB7E57CB 2C4B482F FC81B7AF
            B9DE27E1 E3BD23C2 3A4453BD 9ACE3262
            547EF835 C3DAC4FD 97F8461A 14611DC9
            C2774513 2DED8E54 5C1D54C7 2F046997
        "));
        assert_eq!(&curve.decode_point(&encoded).unwrap(), curve.generator());

        // wrong marker
        let mut compressed = encoded.to_vec();
        compressed[0] = 0x02;
        assert!(curve.decode_point(&compressed).is_none());

        // not on the curve
        let mut off_curve = encoded.to_vec();
        off_curve[64] ^= 0x01;
        assert!(curve.decode_point(&off_curve).is_none());

        // wrong length
        assert!(curve.decode_point(&encoded[..64]).is_none());
    }

    #[test]
    fn test_invalid_curve() {
        // even "prime"
        assert!(PrimeWeierstrassCurve::new(&[0x10], &[0x01], &[0x01], &[0x01], &[0x01]).is_none());

        // generator not on the curve: y**2 = x**3 + x + 1 (mod 23), (3, 9) is not a point
        assert!(PrimeWeierstrassCurve::new(&[23], &[1], &[1], &[3], &[9]).is_none());

        // (3, 10) is a point
        let curve = PrimeWeierstrassCurve::new(&[23], &[1], &[1], &[3], &[10]).unwrap();
        assert_eq!(curve.field_size_bytes(), 1);
    }
}
