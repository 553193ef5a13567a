//! Sid-keyed statement merge and removal (pure functions).

use crate::error::{S3PolicyManagerError, S3PolicyManagerResult};
use crate::types::{PolicyDocument, Statement};

/// Merge a rendered template into the bucket's existing policy.
///
/// With no existing policy the template becomes the policy as-is. Otherwise
/// each incoming statement replaces the existing statement sharing its Sid,
/// in place, and statements with new Sids are appended in incoming order.
/// The last-applied template wins per Sid.
///
/// Providers occasionally return documents with duplicate Sids; those are
/// de-duplicated up front (first occurrence wins) so the merged output always
/// has unique Sids. Statements without a Sid never match anything and are
/// kept as-is.
pub fn merge(existing: Option<PolicyDocument>, incoming: PolicyDocument) -> PolicyDocument {
    let Some(mut existing) = existing else {
        return incoming;
    };

    dedup_by_sid(&mut existing.statement);

    let mut appended: Vec<Statement> = Vec::new();
    for stmt in incoming.statement {
        let existing_pos = position_of_sid(&existing.statement, &stmt);
        if let Some(pos) = existing_pos {
            existing.statement[pos] = stmt;
            continue;
        }
        let appended_pos = position_of_sid(&appended, &stmt);
        if let Some(pos) = appended_pos {
            appended[pos] = stmt;
        } else {
            appended.push(stmt);
        }
    }
    existing.statement.extend(appended);
    existing
}

/// Drop every statement carrying the given Sid.
///
/// Callers must delete the bucket policy outright when the result has no
/// statements left; the provider rejects empty-statement documents.
pub fn remove_by_sid(
    mut existing: PolicyDocument,
    sid: &str,
) -> S3PolicyManagerResult<PolicyDocument> {
    let before = existing.statement.len();
    existing.statement.retain(|stmt| stmt.sid() != Some(sid));
    if existing.statement.len() == before {
        return Err(S3PolicyManagerError::SidNotFound {
            sid: sid.to_string(),
        });
    }
    Ok(existing)
}

fn position_of_sid(statements: &[Statement], stmt: &Statement) -> Option<usize> {
    let sid = stmt.sid()?;
    statements.iter().position(|s| s.sid() == Some(sid))
}

fn dedup_by_sid(statements: &mut Vec<Statement>) {
    let mut seen: Vec<String> = Vec::new();
    statements.retain(|stmt| match stmt.sid() {
        Some(sid) => {
            if seen.iter().any(|s| s == sid) {
                false
            } else {
                seen.push(sid.to_string());
                true
            }
        }
        None => true,
    });
}
