//! Render operands for people and for machines

use serde::Serialize;
use reckon_units::{UnitError, UnitSystem, Value};

/// A rendered result: the friendly text plus the canonical value behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered {
    /// Minimized form, e.g. "1 kilometer"
    pub text: String,
    /// Base unit form, e.g. "1000 meter"
    pub canonical: String,
    pub value: Value,
}

pub struct Renderer<'a> {
    system: &'a UnitSystem,
    minimize: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(system: &'a UnitSystem) -> Self {
        Self { system, minimize: true }
    }

    /// Builder: print base units instead of the most natural unit
    pub fn with_base_units(mut self) -> Self {
        self.minimize = false;
        self
    }

    pub fn text(&self, value: &Value) -> Result<String, UnitError> {
        if self.minimize {
            value.render(self.system)
        } else {
            Ok(value.to_string())
        }
    }

    pub fn render(&self, value: &Value) -> Result<Rendered, UnitError> {
        Ok(Rendered {
            text: self.text(value)?,
            canonical: value.to_string(),
            value: value.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_core::Number;
    use reckon_units::CompoundUnit;

    fn kilometer(system: &UnitSystem) -> Value {
        Value::new(Number::from_i64(1), &CompoundUnit::from_names(&["km"], &[]), system).unwrap()
    }

    #[test]
    fn test_render_minimized() {
        let system = UnitSystem::default();
        let rendered = Renderer::new(&system).render(&kilometer(&system)).unwrap();
        assert_eq!(rendered.text, "1 kilometer");
        assert_eq!(rendered.canonical, "1000 meter");
    }

    #[test]
    fn test_render_base_units() {
        let system = UnitSystem::default();
        let text = Renderer::new(&system).with_base_units().text(&kilometer(&system)).unwrap();
        assert_eq!(text, "1000 meter");
    }

    #[test]
    fn test_rendered_json() {
        let system = UnitSystem::default();
        let rendered = Renderer::new(&system).render(&kilometer(&system)).unwrap();
        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!(json["text"], "1 kilometer");
        assert_eq!(json["value"]["unit"]["numerator"][0], "meter");
    }
}
