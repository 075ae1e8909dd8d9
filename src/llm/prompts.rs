//! Prompt templates for query rewriting and answering

use std::collections::HashMap;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }

    /// Render from `(name, value)` pairs
    #[must_use]
    pub fn render_with(&self, values: &[(&str, &str)]) -> String {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.render(&values)
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // skip second '{'
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                    chars.next();
                }
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Render the dictionary the way the rewrite prompt expects it: `['a -> b', 'c -> d']`
#[must_use]
pub fn format_dictionary(rules: &[String]) -> String {
    let quoted: Vec<String> = rules.iter().map(|rule| format!("'{rule}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Income-tax assistant prompts
pub struct TaxPrompts;

impl TaxPrompts {
    /// Dictionary-based question rewrite, sent as a single user message
    #[must_use]
    pub fn dictionary_rewrite() -> PromptTemplate {
        PromptTemplate::new(
            r"사용자의 질문을 보고, 우리의 사전을 참조해서 사용자의 질문을 변경해주세요.
만약 변경할 필요가 없다고 판단된다면, 사용자의 질문을 바꾸지 않아도 되며, 이런 경우에는 사용자의 질문을 그대로 반환해주세요.

사전: {{dictionary}}
질문: {{question}}

답변은 변경된 질문만 반환하고, 추가 설명은 하지 마세요.",
        )
    }

    /// System instruction for answering; the retrieved context follows it
    #[must_use]
    pub fn answer_system() -> PromptTemplate {
        PromptTemplate::new(
            r"당신은 소득세법 전문가입니다. 사용자의 소득세법에 관한 질문에 답변해주세요.
아래에 제공된 문서를 활용해서 답변해주시고, 답변을 알 수 없다면 모른다고 답변해주세요.
답변을 제공할 때는 소득세법 (XX조)에 따르면 이라고 시작하면서 답변해주시고,
2-3 문장정도의 짧은 내용의 답변을 원하며, 구체적으로 금액까지 언급해주세요.

{{context}}",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables() {
        let template = PromptTemplate::new("Hello {{name}}, you are {{age}} years old.");
        assert_eq!(template.variables(), &["name", "age"]);
    }

    #[test]
    fn test_template_render() {
        let template = PromptTemplate::new("Hello {{name}}!");
        let mut values = HashMap::new();
        values.insert("name".to_string(), "Alice".to_string());
        assert_eq!(template.render(&values), "Hello Alice!");
    }

    #[test]
    fn test_unknown_variables_left_untouched() {
        let template = PromptTemplate::new("{{a}} and {{b}}");
        assert_eq!(template.render_with(&[("a", "1")]), "1 and {{b}}");
    }

    #[test]
    fn test_format_dictionary() {
        let rules = vec![
            "사람을 나타내는 표현 -> 거주자".to_string(),
            "직장인 -> 근로소득자".to_string(),
        ];
        assert_eq!(
            format_dictionary(&rules),
            "['사람을 나타내는 표현 -> 거주자', '직장인 -> 근로소득자']"
        );
        assert_eq!(format_dictionary(&[]), "[]");
    }

    #[test]
    fn test_rewrite_prompt_variables() {
        let template = TaxPrompts::dictionary_rewrite();
        assert_eq!(template.variables(), &["dictionary", "question"]);

        let rendered =
            template.render_with(&[("dictionary", "['a -> b']"), ("question", "직장인 세금?")]);
        assert!(rendered.contains("사전: ['a -> b']"));
        assert!(rendered.contains("질문: 직장인 세금?"));
    }

    #[test]
    fn test_answer_system_ends_with_context() {
        let rendered = TaxPrompts::answer_system().render_with(&[("context", "A\n\nB")]);
        assert!(rendered.starts_with("당신은 소득세법 전문가입니다."));
        assert!(rendered.ends_with("\n\nA\n\nB"));
    }
}
