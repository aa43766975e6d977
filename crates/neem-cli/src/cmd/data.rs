use crate::output::{print_json, print_table};
use crate::settings;
use neem_core::{Config, DataQuery, NeemData};
use std::sync::Arc;

/// `neem data [NAME]`: list the canned queries, or run one by name.
pub fn run(config: &Config, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let Some(name) = name else {
        return list(json);
    };
    // Reject unknown names before touching the reasoner.
    let query: DataQuery = name.parse()?;

    let neem = settings::interface(config)?;
    let data = NeemData::new(Arc::new(neem), config.neem.neem_uri.clone());
    let result = data.run(query)?;
    if json {
        print_json(&result)
    } else {
        println!("{}", serde_json::to_string(&result)?);
        Ok(())
    }
}

fn list(json: bool) -> anyhow::Result<()> {
    if json {
        let names: Vec<&str> = DataQuery::ALL.iter().map(|q| q.name()).collect();
        return print_json(&names);
    }
    let rows = DataQuery::ALL
        .iter()
        .map(|q| {
            let mode = if q.is_strict() { "strict" } else { "lenient" };
            vec![q.name().to_string(), mode.to_string()]
        })
        .collect();
    print_table(&["NAME", "MODE"], rows);
    Ok(())
}
