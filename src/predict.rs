use std::fmt::{self, Display};

use crate::{
    arch,
    dataset::{TrainingSet, checked_channel, scale_channel},
    error::Result,
    params::ParamSnapshot,
};

/// Which font reads better on a background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontShade {
    Dark,
    Light,
}

impl Display for FontShade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontShade::Dark => f.write_str("DARK"),
            FontShade::Light => f.write_str("LIGHT"),
        }
    }
}

/// Returns the network's `[dark, light]` outputs for a raw `0..=255` color.
///
/// # Errors
/// Returns `FontError::ChannelOutOfRange` if a channel is outside `0..=255`.
pub fn predict_probability(snapshot: &ParamSnapshot, r: i64, g: i64, b: i64) -> Result<[f64; 2]> {
    let input = [
        scale_channel(checked_channel(0, "red", r)?),
        scale_channel(checked_channel(0, "green", g)?),
        scale_channel(checked_channel(0, "blue", b)?),
    ];

    Ok(arch::evaluate_one(snapshot, input))
}

/// Picks the font shade for a raw `0..=255` color.
///
/// Dark wins only if its output is strictly greater than the light one.
pub fn predict(snapshot: &ParamSnapshot, r: i64, g: i64, b: i64) -> Result<FontShade> {
    let [dark, light] = predict_probability(snapshot, r, g, b)?;
    Ok(if dark > light {
        FontShade::Dark
    } else {
        FontShade::Light
    })
}

/// Fraction of samples whose predicted shade matches the label.
pub fn accuracy(snapshot: &ParamSnapshot, data: &TrainingSet) -> f64 {
    let y_pred = arch::evaluate(snapshot, data.inputs());
    let targets = data.targets();

    let hits = y_pred
        .columns()
        .into_iter()
        .zip(targets.columns())
        .filter(|(pred, target)| (pred[0] > pred[1]) == (target[0] > target[1]))
        .count();

    hits as f64 / data.len() as f64
}
