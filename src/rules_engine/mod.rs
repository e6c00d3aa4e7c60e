// Copyright 2026
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Pure predicate evaluator over a fact map: `evaluate(ruleGroup, factMap)
//! -> bool`. Condition-builder style (`condition: "AND" | "OR", rules:
//! [...]`), with leaves and nested groups composing into a tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    IsNull,
    IsNotNull,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

/// A node in the condition tree: either a leaf rule or a nested group.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNode {
    Leaf(Rule),
    Group(RuleGroup),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleGroup {
    pub condition: Combinator,
    pub rules: Vec<RuleNode>,
}

pub type FactMap = BTreeMap<String, Value>;

/// Evaluates a rule tree against a fact map. An empty group evaluates to
/// `true` under AND (vacuously satisfied) and `false` under OR.
pub fn evaluate(group: &RuleGroup, facts: &FactMap) -> bool {
    let results = group.rules.iter().map(|node| match node {
        RuleNode::Leaf(rule) => evaluate_rule(rule, facts),
        RuleNode::Group(sub) => evaluate(sub, facts),
    });
    match group.condition {
        Combinator::And => results.fold(true, |acc, r| acc && r),
        Combinator::Or => {
            if group.rules.is_empty() {
                false
            } else {
                results.fold(false, |acc, r| acc || r)
            }
        }
    }
}

fn evaluate_rule(rule: &Rule, facts: &FactMap) -> bool {
    let actual = facts.get(&rule.field);

    match rule.operator {
        Operator::IsNull => return actual.is_none() || actual == Some(&Value::Null),
        Operator::IsNotNull => return actual.is_some() && actual != Some(&Value::Null),
        _ => {}
    }

    let Some(actual) = actual else { return false };

    match rule.operator {
        Operator::Equal => values_equal(actual, &rule.value),
        Operator::NotEqual => !values_equal(actual, &rule.value),
        Operator::Contains => as_text(actual).contains(&as_text(&rule.value)),
        Operator::NotContains => !as_text(actual).contains(&as_text(&rule.value)),
        Operator::Greater => compare_numeric(actual, &rule.value).is_some_and(|o| o.is_gt()),
        Operator::Less => compare_numeric(actual, &rule.value).is_some_and(|o| o.is_lt()),
        Operator::GreaterOrEqual => compare_numeric(actual, &rule.value).is_some_and(|o| o.is_ge()),
        Operator::LessOrEqual => compare_numeric(actual, &rule.value).is_some_and(|o| o.is_le()),
        Operator::IsNull | Operator::IsNotNull => unreachable!(),
    }
}

fn as_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    as_text(a) == as_text(b)
}

fn compare_numeric(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    let a = a.as_f64().or_else(|| as_text(a).parse::<f64>().ok())?;
    let b = b.as_f64().or_else(|| as_text(b).parse::<f64>().ok())?;
    a.partial_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts() -> FactMap {
        let mut f = FactMap::new();
        f.insert("severity".into(), json!("critical"));
        f.insert("alertCount".into(), json!(3));
        f
    }

    #[test]
    fn and_group_requires_all() {
        let group = RuleGroup {
            condition: Combinator::And,
            rules: vec![
                RuleNode::Leaf(Rule { field: "severity".into(), operator: Operator::Equal, value: json!("critical") }),
                RuleNode::Leaf(Rule { field: "alertCount".into(), operator: Operator::Greater, value: json!(1) }),
            ],
        };
        assert!(evaluate(&group, &facts()));
    }

    #[test]
    fn or_group_requires_any() {
        let group = RuleGroup {
            condition: Combinator::Or,
            rules: vec![
                RuleNode::Leaf(Rule { field: "severity".into(), operator: Operator::Equal, value: json!("low") }),
                RuleNode::Leaf(Rule { field: "alertCount".into(), operator: Operator::Equal, value: json!(3) }),
            ],
        };
        assert!(evaluate(&group, &facts()));
    }

    #[test]
    fn missing_field_fails_non_null_checks() {
        let group = RuleGroup {
            condition: Combinator::And,
            rules: vec![RuleNode::Leaf(Rule { field: "missing".into(), operator: Operator::Equal, value: json!("x") })],
        };
        assert!(!evaluate(&group, &facts()));
    }

    #[test]
    fn is_null_on_missing_field() {
        let group = RuleGroup {
            condition: Combinator::And,
            rules: vec![RuleNode::Leaf(Rule { field: "missing".into(), operator: Operator::IsNull, value: Value::Null })],
        };
        assert!(evaluate(&group, &facts()));
    }

    #[test]
    fn nested_group_evaluates() {
        let group = RuleGroup {
            condition: Combinator::And,
            rules: vec![RuleNode::Group(RuleGroup {
                condition: Combinator::Or,
                rules: vec![RuleNode::Leaf(Rule { field: "severity".into(), operator: Operator::Equal, value: json!("critical") })],
            })],
        };
        assert!(evaluate(&group, &facts()));
    }

    #[test]
    fn empty_and_group_is_vacuously_true() {
        let group = RuleGroup { condition: Combinator::And, rules: vec![] };
        assert!(evaluate(&group, &facts()));
    }
}
