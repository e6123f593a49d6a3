use serde_json::{Map, Value};

use crate::DocumentError;

/// Check a raw tree document before it is deserialized, reporting the first
/// problem with the path of the offending node (`root.children[1]`).
///
/// Required: `state` (string) and `statistics` with `numVisits` (unsigned
/// integer) and `relativeVisits` (number in `[0, 100]`). Optional `children`,
/// `isPlayout`, `id` and `statisticsForActions` are type-checked when present.
pub fn validate_tree(value: &Value) -> Result<(), DocumentError> {
    validate_tree_at(value, "root")
}

/// Same as `validate_tree`, with `root_path` naming the document's root.
pub fn validate_tree_at(value: &Value, root_path: &str) -> Result<(), DocumentError> {
    let mut stack = vec![(value, root_path.to_string())];
    while let Some((node, path)) = stack.pop() {
        let object = as_object(node, &path)?;

        match object.get("state") {
            None => return Err(missing(&path, "state")),
            Some(Value::String(_)) => {}
            Some(_) => return Err(invalid(&path, "state", "must be a string")),
        }

        let statistics = object
            .get("statistics")
            .ok_or_else(|| missing(&path, "statistics"))?;
        validate_statistics(statistics, &format!("{path}.statistics"))?;

        if let Some(id) = object.get("id") {
            if !id.is_string() && !id.is_null() {
                return Err(invalid(&path, "id", "must be a string"));
            }
        }
        if let Some(playout) = object.get("isPlayout") {
            if !playout.is_boolean() {
                return Err(invalid(&path, "isPlayout", "must be a boolean"));
            }
        }

        match object.get("children") {
            None => {}
            Some(Value::Array(children)) => {
                for (i, child) in children.iter().enumerate().rev() {
                    stack.push((child, format!("{path}.children[{i}]")));
                }
            }
            Some(_) => return Err(invalid(&path, "children", "must be an array")),
        }
    }
    Ok(())
}

fn validate_statistics(value: &Value, path: &str) -> Result<(), DocumentError> {
    let object = as_object(value, path)?;

    let visits = object
        .get("numVisits")
        .ok_or_else(|| missing(path, "numVisits"))?;
    if visits.as_u64().is_none() {
        return Err(invalid(path, "numVisits", "must be a non-negative integer"));
    }

    let relative = object
        .get("relativeVisits")
        .ok_or_else(|| missing(path, "relativeVisits"))?
        .as_f64()
        .ok_or_else(|| invalid(path, "relativeVisits", "must be a number"))?;
    if !(0.0..=100.0).contains(&relative) {
        return Err(invalid(
            path,
            "relativeVisits",
            &format!("must be a percentage in [0, 100], got {relative}"),
        ));
    }

    match object.get("statisticsForActions") {
        None => Ok(()),
        Some(Value::Array(roles)) => {
            for (i, role) in roles.iter().enumerate() {
                validate_role(role, &format!("{path}.statisticsForActions[{i}]"))?;
            }
            Ok(())
        }
        Some(_) => Err(invalid(path, "statisticsForActions", "must be an array")),
    }
}

fn validate_role(value: &Value, path: &str) -> Result<(), DocumentError> {
    let object = as_object(value, path)?;
    if !object.get("role").ok_or_else(|| missing(path, "role"))?.is_string() {
        return Err(invalid(path, "role", "must be a string"));
    }
    let actions = object
        .get("actions")
        .ok_or_else(|| missing(path, "actions"))?
        .as_array()
        .ok_or_else(|| invalid(path, "actions", "must be an array"))?;

    for (i, action) in actions.iter().enumerate() {
        let action_path = format!("{path}.actions[{i}]");
        let object = as_object(action, &action_path)?;
        if !object
            .get("action")
            .ok_or_else(|| missing(&action_path, "action"))?
            .is_string()
        {
            return Err(invalid(&action_path, "action", "must be a string"));
        }
        let score = object
            .get("averageActionScore")
            .ok_or_else(|| missing(&action_path, "averageActionScore"))?
            .as_f64()
            .ok_or_else(|| invalid(&action_path, "averageActionScore", "must be a number"))?;
        if !score.is_finite() {
            return Err(invalid(&action_path, "averageActionScore", "must be finite"));
        }
        if object
            .get("actionNumUsed")
            .ok_or_else(|| missing(&action_path, "actionNumUsed"))?
            .as_u64()
            .is_none()
        {
            return Err(invalid(
                &action_path,
                "actionNumUsed",
                "must be a non-negative integer",
            ));
        }
    }
    Ok(())
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, DocumentError> {
    value.as_object().ok_or_else(|| DocumentError::NotAnObject {
        path: path.to_string(),
    })
}

fn missing(path: &str, field: &'static str) -> DocumentError {
    DocumentError::MissingField {
        path: path.to_string(),
        field,
    }
}

fn invalid(path: &str, field: &'static str, reason: &str) -> DocumentError {
    DocumentError::InvalidField {
        path: path.to_string(),
        field,
        reason: reason.to_string(),
    }
}
