//! Derived ratio fields.

use std::collections::BTreeMap;

use crate::types::{DerivedSpec, Value};

/// Compute every configured derived field on a cleaned row.
///
/// `numerator / denominator * 100`. An absent or zero denominator yields
/// [`Value::Absent`], and a non-finite quotient is coerced to
/// [`Value::Absent`] before storage. Never an error, never infinity.
pub fn apply(derived: &[DerivedSpec], fields: &mut BTreeMap<String, Value>) {
    for spec in derived {
        let numerator = fields.get(&spec.numerator).and_then(Value::as_number);
        let denominator = fields.get(&spec.denominator).and_then(Value::as_number);

        let value = match (numerator, denominator) {
            (Some(n), Some(d)) if d != 0.0 => {
                let ratio = n / d * 100.0;
                if ratio.is_finite() {
                    Value::Number(ratio)
                } else {
                    Value::Absent
                }
            }
            _ => Value::Absent,
        };

        fields.insert(spec.canonical.clone(), value);
    }
}
