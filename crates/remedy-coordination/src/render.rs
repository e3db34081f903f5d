//! Template expansion for coordination directives.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::directive::CoordinationDirective;
use crate::error::{CoordinationError, Result};

/// Renders coordination directives against a directory of templates.
///
/// One template file per coordination function, named
/// `<function>.template`. Placeholders:
///
/// - `{{unique_id}}` — a fresh UUID, minted per render, so each
///   generated rule carries its own identity
/// - `{{control_loop_1}}`, `{{control_loop_2}}`, … — the directive's
///   control loops, in directive order
///
/// Rendering is all-or-nothing: any error returns before output is
/// produced.
#[derive(Debug, Clone)]
pub struct CoordinationEvaluator {
    template_dir: PathBuf,
}

impl CoordinationEvaluator {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
        }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Expand the directive's template into a concrete rule.
    pub fn render(&self, directive: &CoordinationDirective) -> Result<String> {
        let path = self
            .template_dir
            .join(format!("{}.template", directive.function));
        if !path.is_file() {
            return Err(CoordinationError::TemplateNotFound {
                function: directive.function.clone(),
                dir: self.template_dir.clone(),
            });
        }

        let template = std::fs::read_to_string(&path).map_err(|e| CoordinationError::Render {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let unique_id = Uuid::new_v4();
        debug!(
            function = %directive.function,
            loops = directive.control_loops.len(),
            %unique_id,
            "rendering coordination template"
        );

        let mut rendered = template.replace("{{unique_id}}", &unique_id.to_string());
        for (i, control_loop) in directive.control_loops.iter().enumerate() {
            let placeholder = format!("{{{{control_loop_{}}}}}", i + 1);
            rendered = rendered.replace(&placeholder, control_loop);
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn directive() -> CoordinationDirective {
        CoordinationDirective::load("control_loops: [cl1, cl2]\nfunction: firstBlocksSecond\n")
            .unwrap()
    }

    fn template_dir(body: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("firstBlocksSecond.template"), body).unwrap();
        dir
    }

    #[test]
    fn substitutes_loops_and_a_fresh_token() {
        let dir = template_dir("rule {{unique_id}}: {{control_loop_1}} blocks {{control_loop_2}}");
        let evaluator = CoordinationEvaluator::new(dir.path());

        let rendered = evaluator.render(&directive()).unwrap();
        assert!(rendered.contains("cl1 blocks cl2"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn two_renders_differ_only_in_the_token() {
        let dir = template_dir("{{unique_id}}|{{control_loop_1}}|{{control_loop_2}}");
        let evaluator = CoordinationEvaluator::new(dir.path());
        let directive = directive();

        let first = evaluator.render(&directive).unwrap();
        let second = evaluator.render(&directive).unwrap();
        assert_ne!(first, second);

        let tail = |s: &str| s.splitn(2, '|').nth(1).unwrap().to_string();
        assert_eq!(tail(&first), tail(&second));
        assert_eq!(tail(&first), "cl1|cl2");
    }

    #[test]
    fn missing_template_is_template_not_found() {
        let dir = TempDir::new().unwrap();
        let evaluator = CoordinationEvaluator::new(dir.path());

        let err = evaluator.render(&directive()).unwrap_err();
        assert!(matches!(err, CoordinationError::TemplateNotFound { .. }));
    }

    #[test]
    fn extra_placeholders_beyond_the_loop_count_are_left_alone() {
        let dir = template_dir("{{control_loop_1}} {{control_loop_3}}");
        let evaluator = CoordinationEvaluator::new(dir.path());

        let rendered = evaluator.render(&directive()).unwrap();
        assert!(rendered.starts_with("cl1 "));
        assert!(rendered.contains("{{control_loop_3}}"));
    }
}
