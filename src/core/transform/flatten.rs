//! Hit flattening
//!
//! Projects each `hits.hits[*]._source` object of a search response onto
//! the eleven [`FlatRecord`] columns. Every hit yields exactly one record;
//! absent or unusable fields become `None`.

use crate::domain::{EtlError, FlatRecord, RawResult, Result, Table};
use serde_json::{Map, Value};

/// Source key for each column, in column order
pub const SOURCE_KEYS: [(&str, &str); 11] = [
    ("patient_age", "paciente_idade"),
    ("patient_biological_sex", "paciente_enumSexoBiologico"),
    ("patient_race_color", "paciente_racaCor_valor"),
    ("patient_municipality", "paciente_endereco_nmMunicipio"),
    ("patient_state_code", "paciente_endereco_uf"),
    ("facility_legal_name", "estabelecimento_razaoSocial"),
    ("vaccine_manufacturer_reference", "vacina_fabricante_referencia"),
    ("vaccine_category_name", "vacina_categoria_nome"),
    ("vaccine_lot", "vacina_lote"),
    ("vaccine_manufacturer_name", "vacina_fabricante_nome"),
    ("vaccine_application_date", "vacina_dataAplicacao"),
];

/// Flatten a search response into a [`Table`]
///
/// Output order equals hit order. No deduplication or filtering.
///
/// # Errors
///
/// Returns [`EtlError::StructuralMismatch`] if `hits.hits` is absent or
/// not an array.
///
/// # Examples
///
/// ```
/// use sus_etl::core::transform::flatten_hits;
/// use sus_etl::domain::RawResult;
/// use serde_json::json;
///
/// let raw = RawResult::new(json!({
///     "hits": {"hits": [{"_source": {"paciente_idade": 45, "vacina_lote": "210178"}}]}
/// }));
/// let table = flatten_hits(&raw).unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.records()[0].patient_age, Some(45));
/// assert_eq!(table.records()[0].patient_race_color, None);
/// ```
pub fn flatten_hits(raw: &RawResult) -> Result<Table> {
    let hits = raw
        .body()
        .get("hits")
        .and_then(|h| h.get("hits"))
        .ok_or_else(|| {
            EtlError::StructuralMismatch("response has no 'hits.hits' member".to_string())
        })?
        .as_array()
        .ok_or_else(|| EtlError::StructuralMismatch("'hits.hits' is not an array".to_string()))?;

    let table: Table = hits
        .iter()
        .enumerate()
        .map(|(index, hit)| match hit.get("_source").and_then(Value::as_object) {
            Some(source) => flatten_source(index, source),
            None => {
                tracing::warn!(
                    hit_index = index,
                    "Hit has no '_source' object, emitting an empty record"
                );
                FlatRecord::default()
            }
        })
        .collect();

    tracing::info!(records = table.len(), "Flattened search hits");
    Ok(table)
}

fn flatten_source(index: usize, source: &Map<String, Value>) -> FlatRecord {
    let [
        age,
        sex,
        race,
        municipality,
        state,
        facility,
        reference,
        category,
        lot,
        manufacturer,
        date,
    ] = SOURCE_KEYS.map(|(_, key)| source.get(key));
    let text = |value: Option<&Value>| value.and_then(text_value);

    FlatRecord {
        patient_age: age.and_then(|value| age_value(index, value)),
        patient_biological_sex: text(sex),
        patient_race_color: text(race),
        patient_municipality: text(municipality),
        patient_state_code: text(state),
        facility_legal_name: text(facility),
        vaccine_manufacturer_reference: text(reference),
        vaccine_category_name: text(category),
        vaccine_lot: text(lot),
        vaccine_manufacturer_name: text(manufacturer),
        vaccine_application_date: text(date),
    }
}

/// Strings pass through; other scalars keep their JSON text
///
/// An empty string is absent, so every output format sees a single
/// representation for "no value".
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn age_value(index: usize, value: &Value) -> Option<i32> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };

    if parsed.is_none() {
        tracing::warn!(
            hit_index = index,
            value = %value,
            "Unusable patient age, leaving it empty"
        );
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn full_source() -> Value {
        json!({
            "paciente_idade": 45,
            "paciente_enumSexoBiologico": "F",
            "paciente_racaCor_valor": "PARDA",
            "paciente_endereco_nmMunicipio": "VITORIA",
            "paciente_endereco_uf": "ES",
            "estabelecimento_razaoSocial": "PREFEITURA MUNICIPAL DE VITORIA",
            "vacina_fabricante_referencia": "Organization/00394544000851",
            "vacina_categoria_nome": "Faixa Etária",
            "vacina_lote": "210178",
            "vacina_fabricante_nome": "ASTRAZENECA/FIOCRUZ",
            "vacina_dataAplicacao": "2021-06-14T00:00:00.000Z",
            "paciente_id": "ignored"
        })
    }

    fn raw_with_sources(sources: Vec<Value>) -> RawResult {
        let hits: Vec<Value> = sources.into_iter().map(|s| json!({"_source": s})).collect();
        RawResult::new(json!({"hits": {"total": {"value": hits.len()}, "hits": hits}}))
    }

    #[test]
    fn test_flatten_full_hit() {
        let table = flatten_hits(&raw_with_sources(vec![full_source()])).unwrap();
        assert_eq!(table.len(), 1);

        let record = &table.records()[0];
        assert_eq!(record.patient_age, Some(45));
        assert_eq!(record.patient_biological_sex.as_deref(), Some("F"));
        assert_eq!(record.patient_state_code.as_deref(), Some("ES"));
        assert_eq!(record.vaccine_lot.as_deref(), Some("210178"));
        assert_eq!(
            record.vaccine_application_date.as_deref(),
            Some("2021-06-14T00:00:00.000Z")
        );
    }

    #[test]
    fn test_flatten_preserves_order_and_count() {
        let sources: Vec<Value> = (0..5).map(|age| json!({"paciente_idade": age})).collect();
        let table = flatten_hits(&raw_with_sources(sources)).unwrap();

        let ages: Vec<Option<i32>> = table.iter().map(|r| r.patient_age).collect();
        assert_eq!(ages, vec![Some(0), Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_missing_field_is_none() {
        let mut source = full_source();
        source.as_object_mut().unwrap().remove("paciente_racaCor_valor");

        let table = flatten_hits(&raw_with_sources(vec![source])).unwrap();
        assert_eq!(table.records()[0].patient_race_color, None);
        assert_eq!(table.records()[0].patient_age, Some(45));
    }

    #[test]
    fn test_hit_without_source_yields_empty_record() {
        let raw = RawResult::new(json!({
            "hits": {"hits": [{"_id": "a"}, {"_source": "not an object"}, {"_source": {"vacina_lote": "L1"}}]}
        }));
        let table = flatten_hits(&raw).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0], FlatRecord::default());
        assert_eq!(table.records()[1], FlatRecord::default());
        assert_eq!(table.records()[2].vaccine_lot.as_deref(), Some("L1"));
    }

    #[test]
    fn test_empty_hits_yield_empty_table() {
        let table = flatten_hits(&raw_with_sources(vec![])).unwrap();
        assert!(table.is_empty());
    }

    #[test_case(json!({}) ; "no hits member")]
    #[test_case(json!({"hits": {}}) ; "no inner hits")]
    #[test_case(json!({"hits": {"hits": {}}}) ; "inner hits not an array")]
    #[test_case(json!([1, 2]) ; "body is an array")]
    fn test_structural_mismatch(body: Value) {
        let result = flatten_hits(&RawResult::new(body));
        assert!(matches!(result, Err(EtlError::StructuralMismatch(_))));
    }

    #[test_case(json!(45), Some(45) ; "integer")]
    #[test_case(json!("45"), Some(45) ; "numeric string")]
    #[test_case(json!(" 7 "), Some(7) ; "padded string")]
    #[test_case(json!("forty"), None ; "non numeric string")]
    #[test_case(json!(45.5), None ; "fractional")]
    #[test_case(json!(9_999_999_999_i64), None ; "out of range")]
    #[test_case(json!(null), None ; "null")]
    #[test_case(json!([45]), None ; "array")]
    fn test_age_parsing(value: Value, expected: Option<i32>) {
        assert_eq!(age_value(0, &value), expected);
    }

    #[test_case(json!("ES"), Some("ES") ; "string")]
    #[test_case(json!(""), None ; "empty string")]
    #[test_case(json!(" "), Some(" ") ; "blank string")]
    #[test_case(json!(210178), Some("210178") ; "number")]
    #[test_case(json!(true), Some("true") ; "boolean")]
    #[test_case(json!(null), None ; "null")]
    #[test_case(json!({"a": 1}), None ; "object")]
    fn test_text_value(value: Value, expected: Option<&str>) {
        assert_eq!(text_value(&value).as_deref(), expected);
    }

    #[test]
    fn test_source_keys_cover_every_column() {
        let columns: Vec<&str> = SOURCE_KEYS.iter().map(|(column, _)| *column).collect();
        assert_eq!(columns, FlatRecord::FIELD_NAMES.to_vec());
    }

    #[test]
    fn test_each_source_key_lands_in_its_column() {
        for (position, (_, key)) in SOURCE_KEYS.iter().enumerate() {
            let mut source = Map::new();
            source.insert(key.to_string(), json!("7"));
            let table = flatten_hits(&raw_with_sources(vec![Value::Object(source)])).unwrap();
            let record = &table.records()[0];

            if position == 0 {
                assert_eq!(record.patient_age, Some(7), "{key}");
            } else {
                let mut expected = [None; 10];
                expected[position - 1] = Some("7");
                assert_eq!(record.text_fields(), expected, "{key}");
            }
        }
    }

    #[test]
    fn test_empty_string_is_absent() {
        let mut source = full_source();
        source["paciente_racaCor_valor"] = json!("");

        let table = flatten_hits(&raw_with_sources(vec![source])).unwrap();
        assert_eq!(table.records()[0].patient_race_color, None);
    }
}
