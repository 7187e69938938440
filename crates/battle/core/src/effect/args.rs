//! Typed access to the integer arguments of an effect descriptor.

use crate::env::SkillCategory;
use crate::state::{Ailment, Element, StatKind};

/// Reasons a factory refuses to build an effect.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectBuildError {
    #[error("missing argument #{index}")]
    MissingArg { index: usize },

    #[error("argument #{index} = {value} is outside {min}..={max}")]
    OutOfRange {
        index: usize,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("argument #{index} = {value} is not a stat")]
    UnknownStat { index: usize, value: i32 },

    #[error("argument #{index} = {value} is not an ailment")]
    UnknownAilment { index: usize, value: i32 },

    #[error("argument #{index} = {value} is not an element")]
    UnknownElement { index: usize, value: i32 },

    #[error("argument #{index} = {value} is not a skill category")]
    UnknownCategory { index: usize, value: i32 },
}

/// Borrowed argument list with validating accessors.
#[derive(Clone, Copy, Debug)]
pub struct EffectArgs<'a> {
    values: &'a [i32],
}

impl<'a> EffectArgs<'a> {
    pub fn new(values: &'a [i32]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn raw(&self, index: usize) -> Option<i32> {
        self.values.get(index).copied()
    }

    pub fn int(&self, index: usize) -> Result<i32, EffectBuildError> {
        self.raw(index).ok_or(EffectBuildError::MissingArg { index })
    }

    /// Required integer in `[min, max]`.
    pub fn bounded(&self, index: usize, min: i32, max: i32) -> Result<i32, EffectBuildError> {
        let value = self.int(index)?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(EffectBuildError::OutOfRange {
                index,
                value,
                min,
                max,
            })
        }
    }

    /// Optional integer in `[min, max]`, `default` when absent.
    pub fn bounded_or(
        &self,
        index: usize,
        min: i32,
        max: i32,
        default: i32,
    ) -> Result<i32, EffectBuildError> {
        match self.raw(index) {
            Some(_) => self.bounded(index, min, max),
            None => Ok(default),
        }
    }

    /// Percentage in `[0, 100]`.
    pub fn chance(&self, index: usize) -> Result<u32, EffectBuildError> {
        self.bounded(index, 0, 100).map(|v| v as u32)
    }

    pub fn chance_or(&self, index: usize, default: u32) -> Result<u32, EffectBuildError> {
        self.bounded_or(index, 0, 100, default as i32).map(|v| v as u32)
    }

    /// Scaling percentage in `[0, 1000]`.
    pub fn percent(&self, index: usize) -> Result<u32, EffectBuildError> {
        self.bounded(index, 0, 1000).map(|v| v as u32)
    }

    /// Positive count (turns, hits, amounts) in `[1, max]`.
    pub fn count(&self, index: usize, max: i32) -> Result<u32, EffectBuildError> {
        self.bounded(index, 1, max).map(|v| v as u32)
    }

    pub fn count_or(&self, index: usize, max: i32, default: u32) -> Result<u32, EffectBuildError> {
        self.bounded_or(index, 1, max, default as i32).map(|v| v as u32)
    }

    /// Stage amount in `[1, 6]`.
    pub fn stage_amount(&self, index: usize) -> Result<i8, EffectBuildError> {
        self.bounded(index, 1, 6).map(|v| v as i8)
    }

    pub fn stat(&self, index: usize) -> Result<StatKind, EffectBuildError> {
        let value = self.int(index)?;
        u8::try_from(value)
            .ok()
            .and_then(StatKind::from_repr)
            .ok_or(EffectBuildError::UnknownStat { index, value })
    }

    pub fn ailment(&self, index: usize) -> Result<Ailment, EffectBuildError> {
        let value = self.int(index)?;
        u8::try_from(value)
            .ok()
            .and_then(Ailment::from_repr)
            .ok_or(EffectBuildError::UnknownAilment { index, value })
    }

    pub fn element(&self, index: usize) -> Result<Element, EffectBuildError> {
        let value = self.int(index)?;
        u8::try_from(value)
            .ok()
            .and_then(Element::from_repr)
            .ok_or(EffectBuildError::UnknownElement { index, value })
    }

    pub fn category(&self, index: usize) -> Result<SkillCategory, EffectBuildError> {
        let value = self.int(index)?;
        u8::try_from(value)
            .ok()
            .and_then(SkillCategory::from_repr)
            .ok_or(EffectBuildError::UnknownCategory { index, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_validate() {
        let args = EffectArgs::new(&[30, 4, 99, -1]);
        assert_eq!(args.chance(0), Ok(30));
        assert_eq!(args.stat(1), Ok(StatKind::Speed));
        assert_eq!(
            args.ailment(2),
            Err(EffectBuildError::UnknownAilment { index: 2, value: 99 })
        );
        assert_eq!(
            args.stat(3),
            Err(EffectBuildError::UnknownStat { index: 3, value: -1 })
        );
        assert_eq!(args.int(4), Err(EffectBuildError::MissingArg { index: 4 }));
        assert_eq!(args.chance_or(4, 100), Ok(100));
        assert_eq!(
            args.count(3, 10),
            Err(EffectBuildError::OutOfRange {
                index: 3,
                value: -1,
                min: 1,
                max: 10
            })
        );
    }
}
