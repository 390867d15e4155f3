use super::unit::{MergeKey, TranslationUnit};

/// Units sharing one context name, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub name: String,
    /// Context-level comment (`<context><comment>`).
    pub comment: Option<String>,
    pub units: Vec<TranslationUnit>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            units: Vec::new(),
        }
    }

    /// Index of the unit with this key.
    ///
    /// Id keys only match units carrying that id; text keys match on
    /// `(source, disambiguation)` regardless of ids.
    pub fn position(&self, key: &MergeKey) -> Option<usize> {
        match key {
            MergeKey::Id(id) => self
                .units
                .iter()
                .position(|u| u.id.as_deref() == Some(id.as_str())),
            MergeKey::Text { .. } => self.units.iter().position(|u| &u.text_key() == key),
        }
    }

    pub fn find(&self, key: &MergeKey) -> Option<&TranslationUnit> {
        self.position(key).map(|i| &self.units[i])
    }

    /// Append a unit, taking ownership of its context name.
    pub fn push(&mut self, mut unit: TranslationUnit) -> usize {
        unit.context.clone_from(&self.name);
        self.units.push(unit);
        self.units.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_sets_context_name() {
        let mut ctx = Context::new("Dialog");
        let index = ctx.push(TranslationUnit::new("Other", "Save"));
        assert_eq!(ctx.units[index].context, "Dialog");
    }

    #[test]
    fn test_position_by_text_and_id() {
        let mut ctx = Context::new("Dialog");
        let mut with_id = TranslationUnit::new("Dialog", "Open");
        with_id.id = Some("dialog.open".to_string());
        ctx.push(TranslationUnit::new("Dialog", "Save"));
        ctx.push(with_id);

        assert_eq!(ctx.position(&MergeKey::text("Save", None)), Some(0));
        assert_eq!(ctx.position(&MergeKey::text("Open", None)), Some(1));
        assert_eq!(
            ctx.position(&MergeKey::Id("dialog.open".to_string())),
            Some(1)
        );
        assert_eq!(ctx.position(&MergeKey::Id("missing".to_string())), None);
        assert_eq!(ctx.position(&MergeKey::text("Save", Some("menu"))), None);
    }
}
