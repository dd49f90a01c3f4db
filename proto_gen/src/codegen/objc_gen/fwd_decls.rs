use std::fmt;

/// A declaration a header needs before a type can be mentioned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ForwardDeclaration {
    Class(String),
    Enum(String),
}

impl fmt::Display for ForwardDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardDeclaration::Class(name) => write!(f, "@class {};", name),
            ForwardDeclaration::Enum(name) => write!(f, "GPB_ENUM_FWD_DECLARE({});", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_rendering_and_ordering() {
        let decls: BTreeSet<_> = [
            ForwardDeclaration::Enum("OPShade".to_string()),
            ForwardDeclaration::Class("TPZed".to_string()),
            ForwardDeclaration::Class("TPBar".to_string()),
        ]
        .into_iter()
        .collect();
        let lines: Vec<_> = decls.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "@class TPBar;",
                "@class TPZed;",
                "GPB_ENUM_FWD_DECLARE(OPShade);"
            ]
        );
    }
}
