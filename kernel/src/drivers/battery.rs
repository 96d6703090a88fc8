// Battery voltage from a resistor divider
//
// Sense pin sits between R1 (to battery +) and R2 (to ground), so the
// pin sees vIn * R2 / (R1 + R2). Raw code -> pin volts -> battery volts,
// then the calibration offset is subtracted.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divider {
    pub r1_ohms: f32,
    pub r2_ohms: f32,
    /// Converter full-scale voltage.
    pub vref: f32,
    /// Code that corresponds to `vref`.
    pub max_code: u16,
}

impl Divider {
    /// 39k/9.1k divider on a 10-bit, 5 V converter.
    pub const REFERENCE: Self = Self {
        r1_ohms: 39_000.0,
        r2_ohms: 9_100.0,
        vref: 5.0,
        max_code: 1023,
    };

    pub fn ratio(&self) -> f32 {
        self.r2_ohms / (self.r1_ohms + self.r2_ohms)
    }

    /// Volts at the sense pin. Codes above full scale are clamped.
    pub fn pin_volts(&self, code: u16) -> f32 {
        let code = code.min(self.max_code);
        code as f32 * self.vref / self.max_code as f32
    }

    /// Volts at the top of the divider.
    pub fn input_volts(&self, code: u16) -> f32 {
        self.pin_volts(code) / self.ratio()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryReading {
    pub code: u16,
    pub input_volts: f32,
    pub calibrated: f32,
}

pub struct VoltageSampler {
    divider: Divider,
    last: Option<BatteryReading>,
}

impl VoltageSampler {
    pub const fn new(divider: Divider) -> Self {
        Self {
            divider,
            last: None,
        }
    }

    /// Convert one raw code. `offset` is used as-is; a NaN offset yields
    /// a NaN reading, so callers must hold a repaired value.
    pub fn sample(&mut self, code: u16, offset: f32) -> f32 {
        let input_volts = self.divider.input_volts(code);
        let calibrated = input_volts - offset;
        self.last = Some(BatteryReading {
            code,
            input_volts,
            calibrated,
        });
        calibrated
    }

    pub fn last(&self) -> Option<BatteryReading> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_divider_math() {
        let d = Divider::REFERENCE;
        assert!((d.ratio() - 9100.0 / 48100.0).abs() < 1e-6);
        assert_eq!(d.pin_volts(0), 0.0);
        assert!((d.pin_volts(1023) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn code_614_through_reference_divider() {
        let mut s = VoltageSampler::new(Divider::REFERENCE);
        let v = s.sample(614, 0.0);
        // 614 * 5 / 1023 = 3.0010 V at the pin, / 0.18919 = 15.862 V
        assert!((v - 15.862).abs() < 0.01, "got {}", v);

        let last = s.last().unwrap();
        assert_eq!(last.code, 614);
        assert_eq!(last.calibrated, v);
    }

    #[test]
    fn millivolt_codes_scale_one_to_one() {
        // calibrated ADC readings: one code per millivolt at the pin
        let d = Divider {
            r1_ohms: 100_000.0,
            r2_ohms: 10_000.0,
            vref: 2.5,
            max_code: 2500,
        };
        assert!((d.pin_volts(1820) - 1.82).abs() < 1e-6);
        assert!((d.input_volts(1820) - 20.02).abs() < 1e-3);
    }

    #[test]
    fn offset_is_subtracted() {
        let mut s = VoltageSampler::new(Divider::REFERENCE);
        let raw = s.sample(500, 0.0);
        let corrected = s.sample(500, 1.38);
        assert!((raw - corrected - 1.38).abs() < 1e-4);
    }

    #[test]
    fn codes_above_full_scale_clamp() {
        let mut s = VoltageSampler::new(Divider::REFERENCE);
        assert_eq!(s.sample(4000, 0.0), s.sample(1023, 0.0));
    }

    proptest! {
        #[test]
        fn sample_is_monotonic_in_code(a in 0u16..=1023, b in 0u16..=1023, offset in -5.0f32..5.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let mut s = VoltageSampler::new(Divider::REFERENCE);
            let v_lo = s.sample(lo, offset);
            let v_hi = s.sample(hi, offset);
            prop_assert!(v_lo <= v_hi);
        }
    }
}
