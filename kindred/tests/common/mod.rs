#![allow(dead_code)]

use kindred::{
    Dispatcher, ExtensionConfig, ExtensionRegistry, Handler, Json, Remainder, Reply,
    RequestContext, ResourceChain, ResourceKind, RestError, RouteMeta, RouteTable, Verb,
    factory_fn,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

// ============================================================================
// In-memory change store
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ChangeRecord {
    pub topic: Option<String>,
    pub abandoned: bool,
    pub reviewers: Vec<String>,
    pub edits: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct Store {
    changes: Mutex<BTreeMap<String, ChangeRecord>>,
}

impl Store {
    pub fn with_changes(ids: &[&str]) -> Arc<Self> {
        let store = Store::default();
        {
            let mut changes = store.changes.lock().unwrap();
            for id in ids {
                changes.insert((*id).to_owned(), ChangeRecord::default());
            }
        }
        Arc::new(store)
    }

    pub fn get(&self, id: &str) -> Option<ChangeRecord> {
        self.changes.lock().unwrap().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.changes.lock().unwrap().keys().cloned().collect()
    }

    fn update<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut ChangeRecord) -> Result<T, RestError>,
    ) -> Result<T, RestError> {
        let mut changes = self.changes.lock().unwrap();
        let record = changes
            .get_mut(id)
            .ok_or_else(|| RestError::NotFound(format!("change {id}")))?;
        f(record)
    }
}

/// Identifier of the root change in the chain.
fn change_id(chain: &ResourceChain) -> Result<String, RestError> {
    chain
        .iter()
        .next()
        .map(|r| r.id.clone())
        .ok_or_else(|| RestError::BadRequest("change id required".into()))
}

fn existing(store: &Store, chain: &ResourceChain) -> Result<(String, ChangeRecord), RestError> {
    let id = change_id(chain)?;
    let record = store
        .get(&id)
        .ok_or_else(|| RestError::NotFound(format!("change {id}")))?;
    Ok((id, record))
}

// ============================================================================
// Handlers
// ============================================================================

pub struct Show(pub Value);

impl Handler for Show {
    type Output = Value;

    async fn invoke(self) -> Result<Value, RestError> {
        Ok(self.0)
    }
}

pub struct SetTopic {
    store: Arc<Store>,
    id: String,
    topic: Option<String>,
}

impl Handler for SetTopic {
    type Output = Option<Value>;

    async fn invoke(self) -> Result<Option<Value>, RestError> {
        let topic = self.topic.clone();
        self.store.update(&self.id, |record| {
            record.topic = topic;
            Ok(())
        })?;
        Ok(self.topic.map(Value::String))
    }
}

#[derive(Debug, Deserialize)]
struct TopicInput {
    topic: Option<String>,
}

pub struct Abandon {
    store: Arc<Store>,
    id: String,
}

impl Handler for Abandon {
    type Output = Value;

    async fn invoke(self) -> Result<Value, RestError> {
        self.store.update(&self.id, |record| {
            if record.abandoned {
                return Err(RestError::Conflict("change is abandoned".into()));
            }
            record.abandoned = true;
            Ok(json!({ "id": self.id, "status": "ABANDONED" }))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReviewerInput {
    reviewer: String,
}

pub struct AddReviewer {
    store: Arc<Store>,
    id: String,
    reviewer: String,
}

impl Handler for AddReviewer {
    type Output = Reply;

    async fn invoke(self) -> Result<Reply, RestError> {
        let reviewer = self.reviewer.clone();
        self.store.update(&self.id, |record| {
            if record.reviewers.contains(&reviewer) {
                return Err(RestError::Conflict(format!("{reviewer} already reviews")));
            }
            record.reviewers.push(reviewer);
            Ok(())
        })?;
        Ok(Reply::created(json!({ "reviewer": self.reviewer })))
    }
}

pub struct SaveEdit {
    store: Arc<Store>,
    id: String,
    path: String,
    content: String,
}

impl Handler for SaveEdit {
    type Output = ();

    async fn invoke(self) -> Result<(), RestError> {
        self.store.update(&self.id, |record| {
            record.edits.insert(self.path, self.content);
            Ok(())
        })
    }
}

// ============================================================================
// API bootstrap
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Kinds {
    pub change: ResourceKind,
    pub revision: ResourceKind,
    pub file: ResourceKind,
    pub reviewer: ResourceKind,
    pub vote: ResourceKind,
    pub account: ResourceKind,
}

pub struct Api {
    pub dispatcher: Dispatcher,
    pub kinds: Kinds,
    pub store: Arc<Store>,
}

impl Api {
    pub fn extensions(&self) -> &ExtensionRegistry {
        self.dispatcher.extensions()
    }

    pub async fn call(&self, verb: Verb, target: &str) -> kindred::Response {
        self.dispatcher.dispatch_target(verb, target, None).await
    }

    pub async fn call_with(&self, verb: Verb, target: &str, body: Value) -> kindred::Response {
        self.dispatcher.dispatch_target(verb, target, Some(body)).await
    }
}

pub fn api() -> Api {
    api_with(ExtensionConfig::default())
}

/// The change API with an unsealed extension registry.
pub fn api_with(config: ExtensionConfig) -> Api {
    let store = Store::with_changes(&[
        "1",
        "2",
        "myProject~main~I8473b95934b5732ac55d26311a706c9c2bde9940",
    ]);
    let (table, kinds) = change_table(store.clone());
    let table = Arc::new(table);
    let extensions = Arc::new(ExtensionRegistry::for_table(&table, config));
    Api {
        dispatcher: Dispatcher::new(table, extensions),
        kinds,
        store,
    }
}

pub fn change_table(store: Arc<Store>) -> (RouteTable, Kinds) {
    let mut b = RouteTable::builder();
    let change = b.declare_kind("change", None).unwrap();
    let revision = b.declare_kind("revision", Some(change)).unwrap();
    let file = b.declare_kind("file", Some(revision)).unwrap();
    let reviewer = b.declare_kind("reviewer", Some(change)).unwrap();
    let vote = b.declare_kind("vote", Some(reviewer)).unwrap();
    let account = b.declare_kind("account", None).unwrap();

    b.mount("changes", change).unwrap();
    b.mount("accounts", account).unwrap();
    b.child(change, "revisions", revision).unwrap();
    b.child(revision, "files", file).unwrap();
    b.child(change, "reviewers", reviewer).unwrap();
    b.child(reviewer, "votes", vote).unwrap();

    // /changes
    let s = store.clone();
    b.bind_collection(
        change,
        Verb::Get,
        factory_fn(move |_chain: &ResourceChain, _ctx: RequestContext| Ok(Show(json!(s.ids())))),
    )
    .unwrap();

    // /changes/{id}
    let s = store.clone();
    b.bind(
        change,
        Verb::Get,
        "",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            let (id, record) = existing(&s, chain)?;
            Ok(Show(json!({
                "id": id,
                "topic": record.topic,
                "abandoned": record.abandoned,
            })))
        }),
    )
    .unwrap();

    // /changes/{id}/topic
    let s = store.clone();
    b.bind(
        change,
        Verb::Get,
        "topic",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            let (_, record) = existing(&s, chain)?;
            Ok(Show(json!(record.topic.unwrap_or_default())))
        }),
    )
    .unwrap();

    let s = store.clone();
    b.bind(
        change,
        Verb::Put,
        "topic",
        factory_fn(move |chain: &ResourceChain, ctx: RequestContext| {
            let (id, _) = existing(&s, chain)?;
            let topic = match ctx.verb {
                Verb::Delete => None,
                _ => ctx
                    .extract::<Json<Option<TopicInput>>>()?
                    .0
                    .and_then(|input| input.topic)
                    .filter(|topic| !topic.is_empty()),
            };
            Ok(SetTopic {
                store: s.clone(),
                id,
                topic,
            })
        }),
    )
    .unwrap();
    b.alias(change, Verb::Delete, "topic", Verb::Put, "topic").unwrap();

    // /changes/{id}/abandon
    let s = store.clone();
    b.bind(
        change,
        Verb::Post,
        "abandon",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            let (id, _) = existing(&s, chain)?;
            Ok(Abandon { store: s.clone(), id })
        }),
    )
    .unwrap();

    // /changes/{id}/edit/{path...}
    let s = store.clone();
    b.bind_with_meta(
        change,
        Verb::Put,
        "edit",
        factory_fn(move |chain: &ResourceChain, ctx: RequestContext| {
            let (id, _) = existing(&s, chain)?;
            let Remainder(_) = ctx.extract::<Remainder>()?;
            let content: String = ctx.body_as()?;
            Ok(SaveEdit {
                store: s.clone(),
                id,
                path: ctx.remainder_path(),
                content,
            })
        }),
        RouteMeta::new().with_remainder(),
    )
    .unwrap();

    let s = store.clone();
    b.bind_with_meta(
        change,
        Verb::Get,
        "edit",
        factory_fn(move |chain: &ResourceChain, ctx: RequestContext| {
            let (_, record) = existing(&s, chain)?;
            let path = ctx.remainder_path();
            let content = record
                .edits
                .get(&path)
                .cloned()
                .ok_or_else(|| RestError::NotFound(format!("edit {path}")))?;
            Ok(Show(json!(content)))
        }),
        RouteMeta::new().with_remainder(),
    )
    .unwrap();

    // /changes/{id}/revisions/{rev}/commit
    b.bind(
        revision,
        Verb::Get,
        "commit",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            let rev = chain.id_of(revision).unwrap_or_default();
            Ok(Show(json!({
                "change": change_id(chain)?,
                "revision": rev,
                "subject": format!("Patch Set {rev}"),
            })))
        }),
    )
    .unwrap();

    // /changes/{id}/revisions/{rev}/files/{path}/content
    b.bind(
        file,
        Verb::Get,
        "content",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            Ok(Show(json!({ "path": chain.id_of(file).unwrap_or_default() })))
        }),
    )
    .unwrap();

    // /changes/{id}/reviewers
    let s = store.clone();
    b.bind_collection(
        reviewer,
        Verb::Get,
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            let (_, record) = existing(&s, chain)?;
            Ok(Show(json!(record.reviewers)))
        }),
    )
    .unwrap();

    let s = store.clone();
    b.bind_collection(
        reviewer,
        Verb::Post,
        factory_fn(move |chain: &ResourceChain, ctx: RequestContext| {
            let (id, _) = existing(&s, chain)?;
            let Json(input) = ctx.extract::<Json<ReviewerInput>>()?;
            Ok(AddReviewer {
                store: s.clone(),
                id,
                reviewer: input.reviewer,
            })
        }),
    )
    .unwrap();

    // /changes/{id}/reviewers/{account}
    let s = store.clone();
    b.bind(
        reviewer,
        Verb::Get,
        "",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            let (_, record) = existing(&s, chain)?;
            let name = chain.id_of(reviewer).unwrap_or_default().to_owned();
            if !record.reviewers.contains(&name) {
                return Err(RestError::NotFound(format!("reviewer {name}")));
            }
            Ok(Show(json!({ "reviewer": name })))
        }),
    )
    .unwrap();

    // /changes/{id}/reviewers/{account}/votes/{label}
    b.bind(
        vote,
        Verb::Delete,
        "",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            Ok(Show(json!({ "deleted": chain.id_of(vote).unwrap_or_default() })))
        }),
    )
    .unwrap();
    b.alias(vote, Verb::Post, "delete", Verb::Delete, "").unwrap();

    // /accounts/{id}
    b.bind(
        account,
        Verb::Get,
        "",
        factory_fn(move |chain: &ResourceChain, _ctx: RequestContext| {
            Ok(Show(json!({ "account": chain.id_of(account).unwrap_or_default() })))
        }),
    )
    .unwrap();

    let kinds = Kinds {
        change,
        revision,
        file,
        reviewer,
        vote,
        account,
    };
    (b.build(), kinds)
}
