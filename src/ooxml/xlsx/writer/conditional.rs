//! Conditional formatting: rule model and batch injection.
//!
//! A batch request adds expression rules to the first sheet of a document. Each
//! rule receives the next free priority on that sheet and the next free
//! differential-format id from the style registry, and a background-fill dxf is
//! appended for it. The whole batch is planned before anything is stored, so a
//! failing batch leaves both the sheet and the registry as they were.

use serde::{Deserialize, Serialize};

use crate::ooxml::error::{Result, XlsxError};
use crate::ooxml::xlsx::sheet::Sheet;

use super::styles::{Dxf, StyleRegistry};

/// Kind of a conditional-format rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuleKind {
    /// The rule applies when a formula evaluates to true
    #[default]
    Expression,
    /// A rule read from an existing sheet that is written back as it was read.
    ///
    /// `xml` is the complete `<cfRule>` element with namespace prefixes
    /// removed. The rule's `priority` and `differential_format_id` mirror its
    /// attributes and only take part in priority allocation.
    Preserved { rule_type: String, xml: String },
}

impl RuleKind {
    /// Value of the `cfRule/@type` attribute.
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Expression => "expression",
            RuleKind::Preserved { rule_type, .. } => rule_type,
        }
    }
}

/// A conditional-format rule attached to a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalFormatRule {
    /// Range the rule applies to, e.g. `B1:B10`
    pub target_range: String,
    /// Rule type
    pub kind: RuleKind,
    /// Index into the styles part's `dxfs`
    pub differential_format_id: u32,
    /// Evaluation priority, 1 is evaluated first
    pub priority: u32,
    /// Formula without the leading `=`
    pub formula: String,
}

/// One entry of a conditional-format request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalFormatSpec {
    /// Target range
    pub sqref: String,
    /// Condition formula
    pub formula: String,
    /// ARGB background color applied when the condition holds
    #[serde(rename = "BgColor")]
    pub bg_color: String,
}

/// A batch of conditional formats, deserializable from
/// `{"cf": [{"sqref": "B1", "formula": "$B$1>50", "BgColor": "FFFF0000"}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionalFormatRequest {
    #[serde(default)]
    pub cf: Vec<ConditionalFormatSpec>,
}

impl ConditionalFormatRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn with_rule(
        mut self,
        sqref: impl Into<String>,
        formula: impl Into<String>,
        bg_color: impl Into<String>,
    ) -> Self {
        self.cf.push(ConditionalFormatSpec {
            sqref: sqref.into(),
            formula: formula.into(),
            bg_color: bg_color.into(),
        });
        self
    }
}

/// Rules and dxfs computed for a batch, not yet stored.
#[derive(Debug)]
struct InjectionPlan {
    rules: Vec<ConditionalFormatRule>,
    dxfs: Vec<Dxf>,
    next_dxf_id: u32,
}

fn plan(
    existing: &[ConditionalFormatRule],
    first_dxf_id: u32,
    request: &ConditionalFormatRequest,
) -> Result<InjectionPlan> {
    let mut priority = existing.iter().map(|rule| rule.priority).max().unwrap_or(0);
    let mut next_dxf_id = first_dxf_id;
    let mut rules = Vec::with_capacity(request.cf.len());
    let mut dxfs = Vec::with_capacity(request.cf.len());

    for spec in &request.cf {
        priority = priority
            .checked_add(1)
            .ok_or_else(|| XlsxError::malformed("priority", priority.to_string()))?;
        let dxf_id = next_dxf_id;
        next_dxf_id = next_dxf_id
            .checked_add(1)
            .ok_or_else(|| XlsxError::malformed("dxf count", next_dxf_id.to_string()))?;

        rules.push(ConditionalFormatRule {
            target_range: spec.sqref.clone(),
            kind: RuleKind::Expression,
            differential_format_id: dxf_id,
            priority,
            formula: spec.formula.clone(),
        });
        dxfs.push(Dxf::Fill {
            bg_color: spec.bg_color.clone(),
        });
    }

    Ok(InjectionPlan {
        rules,
        dxfs,
        next_dxf_id,
    })
}

/// Add a batch of expression rules to `sheet`, drawing dxf ids from `styles`.
///
/// Returns the number of rules added.
pub(crate) fn inject_rules(
    sheet: &mut Sheet,
    styles: &mut StyleRegistry,
    request: &ConditionalFormatRequest,
) -> Result<usize> {
    let plan = plan(sheet.conditional_formats(), styles.next_dxf_id(), request)?;
    let added = plan.rules.len();

    log::debug!(
        "adding {} conditional format(s) to sheet '{}', next dxf id {}",
        added,
        sheet.name(),
        plan.next_dxf_id
    );

    sheet.conditional_formats_mut().extend(plan.rules);
    styles.extend_dxfs(plan.dxfs);
    styles.set_dxf_count(plan.next_dxf_id);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sheet() -> Sheet {
        Sheet::new("Sheet1".to_string(), true)
    }

    fn request(n: usize) -> ConditionalFormatRequest {
        (0..n).fold(ConditionalFormatRequest::new(), |req, i| {
            req.with_rule(format!("A{}", i + 1), format!("$A${}>0", i + 1), "FFFF0000")
        })
    }

    #[test]
    fn single_rule_on_fresh_registry() {
        let mut sheet = sheet();
        let mut styles = StyleRegistry::new(None);
        let req = ConditionalFormatRequest::new().with_rule("B1", "$B$1>50", "FFFF0000");

        assert_eq!(inject_rules(&mut sheet, &mut styles, &req).unwrap(), 1);

        let rules = sheet.conditional_formats();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].priority, 1);
        assert_eq!(rules[0].differential_format_id, 0);
        assert_eq!(rules[0].kind, RuleKind::Expression);
        assert_eq!(rules[0].target_range, "B1");
        assert_eq!(rules[0].formula, "$B$1>50");
        assert_eq!(
            styles.dxfs(),
            &[Dxf::Fill {
                bg_color: "FFFF0000".to_string()
            }]
        );
        assert_eq!(styles.next_dxf_id(), 1);
    }

    #[test]
    fn continues_after_existing_rules() {
        let mut sheet = sheet();
        sheet.conditional_formats_mut().push(ConditionalFormatRule {
            target_range: "A1".to_string(),
            kind: RuleKind::Expression,
            differential_format_id: 0,
            priority: 7,
            formula: "TRUE".to_string(),
        });
        let mut styles = StyleRegistry::from_parts(None, Vec::new(), Some("3")).unwrap();

        inject_rules(&mut sheet, &mut styles, &request(2)).unwrap();

        let added: Vec<(u32, u32)> = sheet.conditional_formats()[1..]
            .iter()
            .map(|r| (r.priority, r.differential_format_id))
            .collect();
        assert_eq!(added, vec![(8, 3), (9, 4)]);
        assert_eq!(styles.next_dxf_id(), 5);
    }

    #[test]
    fn empty_batch_changes_nothing() {
        let mut sheet = sheet();
        let mut styles = StyleRegistry::new(None);
        assert_eq!(inject_rules(&mut sheet, &mut styles, &request(0)).unwrap(), 0);
        assert!(sheet.conditional_formats().is_empty());
        assert_eq!(styles.next_dxf_id(), 0);
    }

    #[test]
    fn failing_batch_is_not_applied() {
        let mut sheet = sheet();
        let mut styles = StyleRegistry::new(None);
        styles.set_dxf_count(u32::MAX - 1);

        let err = inject_rules(&mut sheet, &mut styles, &request(2)).unwrap_err();

        assert!(matches!(err, XlsxError::MalformedCounter { .. }));
        assert!(sheet.conditional_formats().is_empty());
        assert!(styles.dxfs().is_empty());
        assert_eq!(styles.next_dxf_id(), u32::MAX - 1);
    }

    #[test]
    fn request_reads_external_schema() {
        let json = r#"{"cf":[{"sqref":"B1","formula":"$B$1>50","BgColor":"FFFF0000"}]}"#;
        let req: ConditionalFormatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            ConditionalFormatRequest::new().with_rule("B1", "$B$1>50", "FFFF0000")
        );
        assert_eq!(serde_json::to_string(&req).unwrap(), json);
    }

    #[test]
    fn preserved_rules_count_towards_priority() {
        let mut sheet = sheet();
        sheet.conditional_formats_mut().push(ConditionalFormatRule {
            target_range: "C1".to_string(),
            kind: RuleKind::Preserved {
                rule_type: "cellIs".to_string(),
                xml: r#"<cfRule type="cellIs" dxfId="0" priority="4" operator="equal"><formula>1</formula></cfRule>"#
                    .to_string(),
            },
            differential_format_id: 0,
            priority: 4,
            formula: String::new(),
        });
        let mut styles = StyleRegistry::new(None);

        inject_rules(&mut sheet, &mut styles, &request(1)).unwrap();

        let rules = sheet.conditional_formats();
        assert_eq!(rules[0].kind.as_str(), "cellIs");
        assert_eq!(rules[1].priority, 5);
        assert_eq!(rules[1].kind, RuleKind::Expression);
    }

    proptest! {
        #[test]
        fn priorities_and_dxf_ids_are_dense(
            existing in 0u32..50,
            first_dxf in 0u32..1000,
            batches in prop::collection::vec(0usize..6, 1..5),
        ) {
            let mut sheet = sheet();
            if existing > 0 {
                sheet.conditional_formats_mut().push(ConditionalFormatRule {
                    target_range: "Z1".to_string(),
                    kind: RuleKind::Expression,
                    differential_format_id: 0,
                    priority: existing,
                    formula: "TRUE".to_string(),
                });
            }
            let mut styles = StyleRegistry::new(None);
            styles.set_dxf_count(first_dxf);

            let mut total = 0u32;
            for n in &batches {
                inject_rules(&mut sheet, &mut styles, &request(*n)).unwrap();
                total += *n as u32;
            }

            let skip = usize::from(existing > 0);
            let added = &sheet.conditional_formats()[skip..];
            let priorities: Vec<u32> = added.iter().map(|r| r.priority).collect();
            let ids: Vec<u32> = added.iter().map(|r| r.differential_format_id).collect();
            prop_assert_eq!(priorities, (existing + 1..=existing + total).collect::<Vec<_>>());
            prop_assert_eq!(ids, (first_dxf..first_dxf + total).collect::<Vec<_>>());
            prop_assert_eq!(styles.next_dxf_id(), first_dxf + total);
            prop_assert_eq!(styles.dxfs().len(), total as usize);
        }
    }
}
