use crate::output::{print_json, print_list};
use crate::settings;
use neem_core::Config;

/// `neem load <PATH>`: restore a recorded NEEM into the knowledge base.
pub fn load(config: &Config, path: &str, json: bool) -> anyhow::Result<()> {
    let neem = settings::interface(config)?;
    neem.load_neem(path)?;
    if json {
        print_json(&serde_json::json!({ "loaded": path }))?;
    } else {
        println!("Loaded NEEM from {path}");
    }
    Ok(())
}

/// `neem actions [--type T]`
pub fn actions(config: &Config, action_type: Option<&str>, json: bool) -> anyhow::Result<()> {
    let neem = settings::interface(config)?;
    let actions = neem.get_all_actions(action_type)?;
    print_list("ACTION", &actions, json)
}

/// `neem states`
pub fn states(config: &Config, json: bool) -> anyhow::Result<()> {
    let neem = settings::interface(config)?;
    let states = neem.get_all_states()?;
    print_list("STATE", &states, json)
}

/// `neem clear`: wipe the reasoner's belief state.
pub fn clear(config: &Config, json: bool) -> anyhow::Result<()> {
    let neem = settings::interface(config)?;
    neem.clear_beliefstate()?;
    if json {
        print_json(&serde_json::json!({ "cleared": true }))?;
    } else {
        println!("Belief state cleared.");
    }
    Ok(())
}
