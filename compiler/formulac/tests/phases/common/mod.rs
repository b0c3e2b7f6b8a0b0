//! Shared rule set for phase tests.
//!
//! Two scopes, `Global` and its child `Global.Equipment`, one player
//! character `pc` and a `sword` carried by it.
//!
//! | Variable | Scope     | Format  |
//! |----------|-----------|---------|
//! | STR      | Global    | Number  |
//! | DEX      | Global    | Number  |
//! | NAME     | Global    | String  |
//! | ALIVE    | Global    | Boolean |
//! | SIZE     | Global    | Size    |
//! | WEIGHT   | Global    | Number  |
//! | WEIGHT   | Equipment | Number  |
//! | BONUS    | Equipment | Number  |

use std::sync::Arc;

use formulac::{
    Format, FormulaManager, FormulaTree, LegalScope, NodeId, ScopeInstance, SharedFormulaManager,
    SharedInterner, SimpleVariableStore, TreeBuilder, Value, VariableId, VariableStore,
};

pub struct Rules {
    pub fm: SharedFormulaManager,
    pub store: Arc<SimpleVariableStore>,
    pub global: LegalScope,
    pub equipment: LegalScope,
    pub pc: ScopeInstance,
    pub sword: ScopeInstance,
    pub size: Format,
}

pub fn rules() -> Rules {
    let store = Arc::new(SimpleVariableStore::new());
    let mut builder = FormulaManager::builder(SharedInterner::new())
        .with_standard_library()
        .store(Arc::clone(&store) as Arc<dyn VariableStore>);

    let global = builder.add_root_scope("Global").unwrap();
    let equipment = builder.add_child_scope(&global, "Equipment").unwrap();
    let size = builder.register_format("Size", "Medium").unwrap();

    for (name, format) in [
        ("STR", Format::Number),
        ("DEX", Format::Number),
        ("NAME", Format::String),
        ("ALIVE", Format::Boolean),
        ("SIZE", size),
        ("WEIGHT", Format::Number),
    ] {
        builder.declare(&global, name, format).unwrap();
    }
    builder.declare(&equipment, "WEIGHT", Format::Number).unwrap();
    builder.declare(&equipment, "BONUS", Format::Number).unwrap();

    let fm = builder.build();
    let pc = fm.instance(&global, "pc", None).unwrap();
    let sword = fm.instance(&equipment, "sword", Some(&pc)).unwrap();
    Rules {
        fm,
        store,
        global,
        equipment,
        pc,
        sword,
        size,
    }
}

impl Rules {
    pub fn tree(&self, build: impl FnOnce(&mut TreeBuilder<'_>) -> NodeId) -> FormulaTree {
        let mut b = TreeBuilder::new(self.fm.interner());
        let root = build(&mut b);
        b.finish(root)
    }

    pub fn id(&self, instance: &ScopeInstance, name: &str) -> VariableId {
        self.fm.resolve(instance, name).unwrap()
    }

    pub fn set(&self, instance: &ScopeInstance, name: &str, value: Value) {
        self.store.set(&self.id(instance, name), value).unwrap();
    }
}
