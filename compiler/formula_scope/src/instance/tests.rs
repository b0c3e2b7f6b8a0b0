use formula_ir::SharedInterner;
use pretty_assertions::assert_eq;
use rayon::prelude::*;

use super::*;
use crate::ScopeTree;

struct Fixture {
    global: LegalScope,
    equipment: LegalScope,
    factory: ScopeInstanceFactory,
}

fn fixture() -> Fixture {
    let mut tree = ScopeTree::new(SharedInterner::new());
    let global = tree.add_root("Global").unwrap();
    let equipment = tree.add_child(&global, "Equipment").unwrap();
    Fixture {
        global,
        equipment,
        factory: ScopeInstanceFactory::new(),
    }
}

#[test]
fn test_instances_are_interned() {
    let f = fixture();
    let a = f.factory.get(&f.global, "pc", None).unwrap();
    let b = f.factory.get(&f.global, "pc", None).unwrap();
    let c = f.factory.get(&f.global, "npc", None).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(f.factory.len(), 2);
}

#[test]
fn test_nested_instance() {
    let f = fixture();
    let pc = f.factory.get(&f.global, "pc", None).unwrap();
    let sword = f.factory.get(&f.equipment, "sword", Some(&pc)).unwrap();

    assert_eq!(sword.scope(), &f.equipment);
    assert_eq!(sword.subject(), "sword");
    assert_eq!(sword.parent(), Some(&pc));
    assert_eq!(sword.to_string(), "Global.Equipment[sword]");

    let chain: Vec<&str> = sword.ancestors().map(ScopeInstance::subject).collect();
    assert_eq!(chain, vec!["sword", "pc"]);
}

#[test]
fn test_release_drops_instance_and_nested() {
    let f = fixture();
    let pc = f.factory.get(&f.global, "pc", None).unwrap();
    let npc = f.factory.get(&f.global, "npc", None).unwrap();
    let sword = f.factory.get(&f.equipment, "sword", Some(&pc)).unwrap();
    f.factory.get(&f.equipment, "shield", Some(&npc)).unwrap();
    assert_eq!(f.factory.len(), 4);

    assert_eq!(f.factory.release(&pc), 2);
    assert_eq!(f.factory.len(), 2);
    assert_eq!(f.factory.release(&pc), 0);

    // Old handles keep working; a new request gets a new identity.
    assert_eq!(sword.parent(), Some(&pc));
    let again = f.factory.get(&f.global, "pc", None).unwrap();
    assert_ne!(again, pc);
    assert_eq!(f.factory.get(&f.global, "npc", None).unwrap(), npc);
    assert_eq!(f.factory.len(), 3);
}

#[test]
fn test_release_nested_leaves_parent() {
    let f = fixture();
    let pc = f.factory.get(&f.global, "pc", None).unwrap();
    let sword = f.factory.get(&f.equipment, "sword", Some(&pc)).unwrap();

    assert_eq!(f.factory.release(&sword), 1);
    assert_eq!(f.factory.len(), 1);
    assert_eq!(f.factory.get(&f.global, "pc", None).unwrap(), pc);
}

#[test]
fn test_same_subject_under_different_parents() {
    let f = fixture();
    let pc = f.factory.get(&f.global, "pc", None).unwrap();
    let npc = f.factory.get(&f.global, "npc", None).unwrap();

    let a = f.factory.get(&f.equipment, "sword", Some(&pc)).unwrap();
    let b = f.factory.get(&f.equipment, "sword", Some(&npc)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_root_instance_with_parent_rejected() {
    let f = fixture();
    let pc = f.factory.get(&f.global, "pc", None).unwrap();

    assert_eq!(
        f.factory.get(&f.global, "other", Some(&pc)).err(),
        Some(ConfigError::InstanceParentMismatch {
            scope: "Global".to_owned(),
            expected: None,
            found: Some("Global".to_owned()),
        })
    );
}

#[test]
fn test_nested_instance_without_parent_rejected() {
    let f = fixture();
    assert_eq!(
        f.factory.get(&f.equipment, "sword", None).err(),
        Some(ConfigError::InstanceParentMismatch {
            scope: "Global.Equipment".to_owned(),
            expected: Some("Global".to_owned()),
            found: None,
        })
    );
}

#[test]
fn test_nested_instance_wrong_parent_scope_rejected() {
    let f = fixture();
    let pc = f.factory.get(&f.global, "pc", None).unwrap();
    let sword = f.factory.get(&f.equipment, "sword", Some(&pc)).unwrap();

    assert!(f.factory.get(&f.equipment, "dagger", Some(&sword)).is_err());
}

#[test]
fn test_concurrent_get_yields_one_instance() {
    let f = fixture();
    let instances: Vec<ScopeInstance> = (0..64)
        .into_par_iter()
        .map(|_| f.factory.get(&f.global, "pc", None).unwrap())
        .collect();

    assert!(instances.iter().all(|i| *i == instances[0]));
    assert_eq!(f.factory.len(), 1);
}
