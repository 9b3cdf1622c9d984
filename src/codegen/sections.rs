//! Fixed sections surrounding the decision logic: the label enumeration,
//! the documentation header, the function signature and the epilogue.

use super::config::GeneratorConfig;
use super::writer::SourceWriter;
use crate::error::CodegenError;
use crate::repr::{ClassLabelSet, ClassTree, FeatureSet, TreeValidationError};

/// Name of the local variable holding the result.
pub(crate) const RETURN_VAR: &str = "ret";

/// `typedef enum { label = i, ... } type_name;` in classifier order.
pub(crate) fn type_declaration(labels: &ClassLabelSet, config: &GeneratorConfig) -> String {
    let mut w = SourceWriter::new(config.indent_width);
    w.line(0, "typedef enum");
    w.line(0, "{");
    for (index, label) in labels.iter().enumerate() {
        w.line(1, format!("{label} = {index},"));
    }
    w.line(0, format!("}} {};", config.type_name));
    w.blank();
    w.into_string()
}

pub(crate) fn doc_header(labels: &ClassLabelSet, config: &GeneratorConfig) -> String {
    let provenance = &config.provenance;
    let mut w = SourceWriter::new(config.indent_width);
    w.line(0, "/*");
    w.line(0, " * \\brief Decision tree classifier");
    w.line(0, " *");
    w.line(
        0,
        " * Decision tree classifier based on the following input characteristics:",
    );
    w.line(0, format!(" *   BLOCK_SIZE: {}", provenance.block_size));
    w.line(0, format!(" *   BLOCK_TYPE: {}", provenance.block_type));
    w.line(0, " *");
    w.line(0, format!(" * \\return {}", config.type_name));
    for (index, label) in labels.iter().enumerate() {
        w.line(0, format!(" *   {index}  {label}"));
    }
    w.line(0, " */");
    w.into_string()
}

/// Function head, opening brace and the result declaration.
///
/// An empty parameter list is written as `(void)`.
pub(crate) fn signature(parameters: &[&str], config: &GeneratorConfig) -> String {
    let args = if parameters.is_empty() {
        String::from("void")
    } else {
        parameters
            .iter()
            .map(|name| format!("const float {name}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut w = SourceWriter::new(config.indent_width);
    w.line(
        0,
        format!("{} {}({})", config.type_name, config.function_name, args),
    );
    w.line(0, "{");
    w.line(1, format!("{} {};", config.type_name, RETURN_VAR));
    w.blank();
    w.into_string()
}

pub(crate) fn epilogue(config: &GeneratorConfig) -> String {
    let mut w = SourceWriter::new(config.indent_width);
    w.blank();
    w.line(1, format!("return {RETURN_VAR};"));
    w.line(0, "}");
    w.into_string()
}

/// Parameter names, one per distinct feature tested anywhere in the tree, in
/// pre-order of first use.
pub(crate) fn parameters<'a>(
    tree: &ClassTree,
    features: &'a FeatureSet,
) -> Result<Vec<&'a str>, CodegenError> {
    let preorder = tree.preorder();
    tree.referenced_features()
        .into_iter()
        .map(|feature| {
            features.name(feature).ok_or_else(|| {
                // Locate the first node using the feature for the report.
                let node = preorder
                    .iter()
                    .copied()
                    .find(|&n| !tree.is_leaf(n) && tree.split_index(n) == feature)
                    .unwrap_or(0);
                CodegenError::from(TreeValidationError::UnknownFeature { node, feature })
            })
        })
        .collect()
}

/// Reject names that would clash in C's single ordinary-identifier scope.
///
/// Parameters and labels may not reuse `ret`, the function name or the type
/// name, and a parameter may not shadow a label.
pub(crate) fn check_collisions(
    parameters: &[&str],
    labels: &ClassLabelSet,
    config: &GeneratorConfig,
) -> Result<(), CodegenError> {
    let reserved = [
        RETURN_VAR,
        config.function_name.as_str(),
        config.type_name.as_str(),
    ];
    let clash = labels
        .iter()
        .find(|label| reserved.contains(label))
        .or_else(|| {
            parameters
                .iter()
                .copied()
                .find(|name| reserved.contains(name) || labels.index_of(name).is_some())
        });
    match clash {
        Some(name) => Err(CodegenError::NameCollision {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_tree;
    use crate::codegen::{BlockType, Provenance};

    fn labels() -> ClassLabelSet {
        ClassLabelSet::new(["low", "high"]).unwrap()
    }

    #[test]
    fn type_declaration_lists_labels_in_order() {
        let text = type_declaration(&labels(), &GeneratorConfig::default());
        assert_eq!(
            text,
            "typedef enum\n{\n    low = 0,\n    high = 1,\n} dtc_t;\n\n"
        );
    }

    #[test]
    fn doc_header_echoes_provenance() {
        let config = GeneratorConfig::builder()
            .provenance(Provenance {
                block_size: 64,
                block_type: BlockType::Sliding,
            })
            .type_name("gesture_t")
            .build()
            .unwrap();
        let text = doc_header(&labels(), &config);
        let expected = "\
/*
 * \\brief Decision tree classifier
 *
 * Decision tree classifier based on the following input characteristics:
 *   BLOCK_SIZE: 64
 *   BLOCK_TYPE: SLIDING
 *
 * \\return gesture_t
 *   0  low
 *   1  high
 */
";
        assert_eq!(text, expected);
    }

    #[test]
    fn signature_with_and_without_parameters() {
        let config = GeneratorConfig::builder().indent_width(2).build().unwrap();
        assert_eq!(
            signature(&["a", "b"], &config),
            "dtc_t dtc(const float a, const float b)\n{\n  dtc_t ret;\n\n"
        );
        assert_eq!(
            signature(&[], &config),
            "dtc_t dtc(void)\n{\n  dtc_t ret;\n\n"
        );
    }

    #[test]
    fn epilogue_returns_result() {
        assert_eq!(
            epilogue(&GeneratorConfig::default()),
            "\n    return ret;\n}\n"
        );
    }

    #[test]
    fn parameters_deduplicate_by_index() {
        let tree = class_tree! {
            0 => split(2, 1.0) -> 1, 2,
            1 => split(2, 0.5) -> 3, 4,
            2 => split(0, 3.0) -> 5, 6,
            3 => leaf(0),
            4 => leaf(1),
            5 => leaf(0),
            6 => leaf(1),
        };
        let features = FeatureSet::new([(0, "x0"), (2, "x2")]).unwrap();
        assert_eq!(parameters(&tree, &features).unwrap(), vec!["x2", "x0"]);
    }

    #[test]
    fn parameters_report_unnamed_feature() {
        let tree = class_tree! {
            0 => split(0, 1.0) -> 1, 2,
            1 => leaf(0),
            2 => split(7, 1.0) -> 3, 4,
            3 => leaf(0),
            4 => leaf(1),
        };
        let features = FeatureSet::from_names(["x0"]).unwrap();
        assert_eq!(
            parameters(&tree, &features),
            Err(CodegenError::MalformedTree(
                TreeValidationError::UnknownFeature { node: 2, feature: 7 }
            ))
        );
    }

    #[test]
    fn collisions_are_reported() {
        let config = GeneratorConfig::default();
        let err = |name: &str| CodegenError::NameCollision { name: name.into() };

        assert_eq!(check_collisions(&["x0"], &labels(), &config), Ok(()));
        assert_eq!(check_collisions(&["low"], &labels(), &config), Err(err("low")));
        assert_eq!(check_collisions(&["ret"], &labels(), &config), Err(err("ret")));
        assert_eq!(check_collisions(&["dtc"], &labels(), &config), Err(err("dtc")));
        assert_eq!(
            check_collisions(&["dtc_t"], &labels(), &config),
            Err(err("dtc_t"))
        );

        let labels = ClassLabelSet::new(["ret", "other"]).unwrap();
        assert_eq!(check_collisions(&[], &labels, &config), Err(err("ret")));
    }
}
