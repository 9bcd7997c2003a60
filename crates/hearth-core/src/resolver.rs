//! Route Resolver
//!
//! Walks the route table for a requested path, runs guards ancestors
//! first, follows redirects under a runtime bound, and finally awaits the
//! matched entry's lazy loader. Per navigation attempt the state machine
//! is:
//!
//! `Matching -> GuardEvaluating -> {Redirecting -> Matching | Blocked |
//! Resolving -> Resolved} | NotFound`
//!
//! A new `resolve` call supersedes any pending one: a generation counter
//! is bumped on entry and re-checked after the loader await, so a stale
//! navigation reports [`NavigationError::Superseded`] and its loaded view
//! is discarded rather than overwriting a newer one.

use crate::context::NavigationContext;
use crate::error::{NavigationError, Result};
use crate::guard::{Guard, Verdict};
use crate::loader::ViewLoader;
use crate::routes::Route;
use hearth_router::{BuildError, EntryId, EntryKind, RouteTable};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runtime bound on redirect hops per navigation.
///
/// Static redirect cycles are rejected at table construction; this bound
/// catches guards that keep issuing fresh redirect directives.
pub const MAX_REDIRECT_DEPTH: usize = 10;

/// A successful navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<V> {
    /// Pattern path of the matched entry, e.g. `customers/:id/matches`
    pub route: String,
    /// Parameters bound while matching
    pub params: HashMap<String, String>,
    /// The loaded view handler, owned by this navigation
    pub view: V,
}

/// The route resolver: an immutable table plus the guard and loader
/// registries the table's ids point into.
pub struct Router<V> {
    table: RouteTable,
    guards: Vec<Arc<dyn Guard>>,
    loaders: Vec<ViewLoader<V>>,
    active: AtomicU64,
    max_redirects: usize,
}

// The guard and loader registries hold bare closures, so only their
// sizes are reportable.
impl<V> fmt::Debug for Router<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .field("guards", &self.guards.len())
            .field("loaders", &self.loaders.len())
            .field("active", &self.active)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

/// Where the next matching pass starts: a fresh path from the root, or a
/// redirect target anchored to the redirecting entry's sibling scope.
enum Request {
    Path(String),
    InScope {
        from: EntryId,
        target: Vec<String>,
        prefix: String,
        inherited: Vec<(String, String)>,
    },
}

impl Request {
    fn path(&self) -> String {
        match self {
            Request::Path(path) => path.clone(),
            Request::InScope { prefix, target, .. } => {
                let tail = target.join("/");
                if prefix.is_empty() {
                    tail
                } else {
                    format!("{prefix}/{tail}")
                }
            }
        }
    }
}

impl<V> Router<V> {
    /// Build a resolver from route declarations.
    ///
    /// Configuration errors (duplicate siblings, entries without exactly
    /// one target, dangling or cyclic redirects) fail here, before the
    /// application starts serving navigations.
    pub fn new(routes: Vec<Route<V>>) -> std::result::Result<Self, BuildError> {
        let mut guards = Vec::new();
        let mut loaders = Vec::new();
        let defs = routes
            .into_iter()
            .map(|route| route.into_def(&mut guards, &mut loaders))
            .collect();
        let table = RouteTable::build(defs)?;
        Ok(Self {
            table,
            guards,
            loaders,
            active: AtomicU64::new(0),
            max_redirects: MAX_REDIRECT_DEPTH,
        })
    }

    /// Resolve a requested path into a loaded view.
    ///
    /// Parameters are rebound into `ctx` on every matching pass, so
    /// guards observe the values for the path currently under
    /// consideration. Calling `resolve` again while a previous call is
    /// awaiting its loader supersedes the previous call.
    pub async fn resolve(&self, path: &str, ctx: &mut NavigationContext) -> Result<Resolution<V>> {
        let generation = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let requested = normalize(path);
        let mut request = Request::Path(requested.clone());
        let mut hops = 0usize;

        loop {
            let current = request.path();
            debug!(path = %current, "matching");
            let matched = match &request {
                Request::Path(path) => {
                    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
                    self.table.find_segments(&segments)
                }
                Request::InScope {
                    from,
                    target,
                    inherited,
                    ..
                } => {
                    let segments: Vec<&str> = target.iter().map(String::as_str).collect();
                    self.table.find_in_scope(*from, &segments, inherited.clone())
                }
            };
            let Some(matched) = matched else {
                debug!(path = %current, "no route matched");
                return Err(NavigationError::NotFound { path: current });
            };
            ctx.bind_params(matched.params.iter().cloned());

            // Ancestor guards first, short-circuiting.
            let mut guard_redirect = None;
            'guards: for &entry in &matched.chain {
                for &guard_id in self.table.guards(entry) {
                    match self.guards[guard_id as usize].check(ctx) {
                        Ok(Verdict::Allow) => {}
                        Ok(Verdict::Block) => {
                            let route = self.table.route_path(entry);
                            debug!(%route, "navigation blocked by guard");
                            return Err(NavigationError::Blocked { route });
                        }
                        Ok(Verdict::Redirect(target)) => {
                            guard_redirect = Some(normalize(&target));
                            break 'guards;
                        }
                        Err(source) => {
                            let route = self.table.route_path(entry);
                            warn!(%route, error = %source, "guard failed");
                            return Err(NavigationError::GuardFailed { route, source });
                        }
                    }
                }
            }

            // Guard directives restart from the root; redirect entries stay
            // anchored to their sibling scope, so a shadowing tree declared
            // earlier can never capture them.
            let next = if let Some(target) = guard_redirect {
                Some(Request::Path(target))
            } else if let EntryKind::Redirect(target) = self.table.kind(matched.entry) {
                let segments: Vec<&str> = current.split('/').filter(|s| !s.is_empty()).collect();
                let keep = segments.len() - matched.leaf_segments;
                let inherited = matched.params[..matched.params.len() - matched.leaf_params].to_vec();
                Some(Request::InScope {
                    from: matched.entry,
                    target: target.clone(),
                    prefix: segments[..keep].join("/"),
                    inherited,
                })
            } else {
                None
            };

            if let Some(next) = next {
                hops += 1;
                if hops > self.max_redirects {
                    warn!(path = %requested, limit = self.max_redirects, "redirect limit exceeded");
                    return Err(NavigationError::RedirectLoop {
                        path: requested,
                        limit: self.max_redirects,
                    });
                }
                debug!(from = %current, to = %next.path(), "redirecting");
                request = next;
                continue;
            }

            let route = self.table.route_path(matched.entry);
            let handler_id = match self.table.kind(matched.entry) {
                EntryKind::View(id) => *id,
                // Groups never terminate a match, redirects were handled above.
                _ => return Err(NavigationError::NotFound { path: current }),
            };

            debug!(%route, "loading view");
            let outcome = (self.loaders[handler_id as usize])().await;
            if self.active.load(Ordering::SeqCst) != generation {
                debug!(%route, "navigation superseded while loading");
                return Err(NavigationError::Superseded);
            }
            let view = match outcome {
                Ok(view) => view,
                Err(source) => {
                    warn!(%route, error = %source, "view load failed");
                    return Err(NavigationError::LoadFailed { route, source });
                }
            };

            debug!(%route, "resolved");
            return Ok(Resolution {
                route,
                params: ctx.params().clone(),
                view,
            });
        }
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{GuardError, GuardResult};
    use crate::loader::{loader, LoadError};
    use crate::state::AppState;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn view(name: &'static str) -> ViewLoader<&'static str> {
        loader(move || async move { Ok(name) })
    }

    fn ctx() -> NavigationContext {
        NavigationContext::new(Arc::new(AppState::default()))
    }

    fn crm_router() -> Router<&'static str> {
        Router::new(vec![
            Route::path("customers").children(vec![
                Route::path("").redirect_to("list"),
                Route::path("list").view(view("customer-list")),
                Route::path("new").view(view("customer-new")),
                Route::path(":id").children(vec![
                    Route::path("edit").view(view("customer-edit")),
                    Route::path("matches").view(view("customer-matches")),
                ]),
            ]),
            Route::path("login").view(view("login")),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_child_redirects_to_list() {
        let router = crm_router();
        let mut ctx = ctx();

        let redirected = router.resolve("customers", &mut ctx).await.unwrap();
        let direct = router.resolve("customers/list", &mut ctx).await.unwrap();
        assert_eq!(redirected.route, direct.route);
        assert_eq!(redirected.view, "customer-list");
    }

    #[tokio::test]
    async fn test_param_binding() {
        let router = crm_router();
        let mut ctx = ctx();

        let res = router.resolve("customers/42/matches", &mut ctx).await.unwrap();
        assert_eq!(res.route, "customers/:id/matches");
        assert_eq!(res.view, "customer-matches");
        assert_eq!(res.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(ctx.param("id"), Some("42"));
    }

    #[test]
    fn test_router_is_debuggable() {
        // The registries hold closures, so Debug reports their sizes; the
        // impl is what lets build results be unwrapped in tests.
        let dump = format!("{:?}", crm_router());
        assert!(dump.contains("Router"));
        assert!(dump.contains("guards"));
        assert!(dump.contains("loaders"));
    }

    #[tokio::test]
    async fn test_entry_redirect_stays_in_sibling_scope() {
        // ":x/list" is declared first and would capture "customers/list"
        // if the redirect re-entered matching from the root.
        let router = Router::new(vec![
            Route::path(":x").children(vec![Route::path("list").view(view("hijacked"))]),
            Route::path("customers").children(vec![
                Route::path("").redirect_to("list"),
                Route::path("list").view(view("customer-list")),
            ]),
        ])
        .unwrap();

        let mut ctx = ctx();
        let res = router.resolve("customers", &mut ctx).await.unwrap();
        assert_eq!(res.view, "customer-list");
        assert_eq!(res.route, "customers/list");
        assert!(res.params.is_empty());
    }

    #[tokio::test]
    async fn test_scoped_redirect_keeps_prefix_params() {
        let router = Router::new(vec![Route::path("customers").children(vec![
            Route::path(":id").children(vec![
                Route::path("old-profile").redirect_to("profile"),
                Route::path("profile").view(view("profile")),
            ]),
        ])])
        .unwrap();

        let mut ctx = ctx();
        let res = router.resolve("customers/42/old-profile", &mut ctx).await.unwrap();
        assert_eq!(res.view, "profile");
        assert_eq!(res.route, "customers/:id/profile");
        assert_eq!(res.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(ctx.param("id"), Some("42"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let router = crm_router();
        let err = router.resolve("customers/42", &mut ctx()).await.unwrap_err();
        assert!(matches!(err, NavigationError::NotFound { path } if path == "customers/42"));
    }

    #[tokio::test]
    async fn test_blocking_guard_skips_loaders() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counted = |loads: &Arc<AtomicUsize>, name: &'static str| {
            let loads = loads.clone();
            loader(move || {
                loads.fetch_add(1, Ordering::SeqCst);
                async move { Ok(name) }
            })
        };

        let router = Router::new(vec![Route::path("secure")
            .guard(|_: &NavigationContext| -> GuardResult { Ok(Verdict::Block) })
            .children(vec![
                Route::path("inner").view(counted(&loads, "inner")),
                Route::path(":id").children(vec![
                    Route::path("edit").view(counted(&loads, "edit")),
                ]),
            ])])
        .unwrap();

        for path in ["secure/inner", "secure/9/edit"] {
            let err = router.resolve(path, &mut ctx()).await.unwrap_err();
            assert!(matches!(err, NavigationError::Blocked { ref route } if route == "secure"));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ancestor_guards_run_first_and_short_circuit() {
        fn record(
            order: &Arc<Mutex<Vec<&'static str>>>,
            name: &'static str,
            verdict: Verdict,
        ) -> impl Guard + 'static {
            let order = order.clone();
            move |_: &NavigationContext| -> GuardResult {
                order.lock().unwrap().push(name);
                Ok(verdict.clone())
            }
        }

        let order = Arc::new(Mutex::new(Vec::new()));

        let router = Router::new(vec![Route::path("outer")
            .guard(record(&order, "outer", Verdict::Allow))
            .children(vec![Route::path("mid")
                .guard(record(&order, "mid", Verdict::Block))
                .children(vec![Route::path("leaf")
                    .guard(record(&order, "leaf", Verdict::Allow))
                    .view(view("leaf"))])])])
        .unwrap();

        let err = router.resolve("outer/mid/leaf", &mut ctx()).await.unwrap_err();
        assert!(matches!(err, NavigationError::Blocked { ref route } if route == "outer/mid"));
        assert_eq!(*order.lock().unwrap(), vec!["outer", "mid"]);
    }

    #[tokio::test]
    async fn test_guard_redirect_directive() {
        let router = Router::new(vec![
            Route::path("account")
                .guard(|ctx: &NavigationContext| -> GuardResult {
                    if ctx.auth().authenticated {
                        Ok(Verdict::Allow)
                    } else {
                        Ok(Verdict::Redirect("login".to_string()))
                    }
                })
                .children(vec![Route::path("profile").view(view("profile"))]),
            Route::path("login").view(view("login")),
        ])
        .unwrap();

        let res = router.resolve("account/profile", &mut ctx()).await.unwrap();
        assert_eq!(res.view, "login");

        let mut signed_in = NavigationContext::new(Arc::new(AppState::signed_in("u-1")));
        let res = router.resolve("account/profile", &mut signed_in).await.unwrap();
        assert_eq!(res.view, "profile");
    }

    #[tokio::test]
    async fn test_guard_failure_is_not_blocked() {
        let router = Router::new(vec![Route::path("flaky")
            .guard(|_: &NavigationContext| -> GuardResult {
                Err(GuardError::new("session store down"))
            })
            .children(vec![Route::path("x").view(view("x"))])])
        .unwrap();

        let err = router.resolve("flaky/x", &mut ctx()).await.unwrap_err();
        match err {
            NavigationError::GuardFailed { route, source } => {
                assert_eq!(route, "flaky");
                assert_eq!(source.to_string(), "session store down");
            }
            other => panic!("expected GuardFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_failure() {
        let router: Router<&str> = Router::new(vec![Route::path("broken")
            .view(loader(|| async { Err(LoadError::new("chunk 404")) }))])
        .unwrap();

        let err = router.resolve("broken", &mut ctx()).await.unwrap_err();
        match err {
            NavigationError::LoadFailed { route, source } => {
                assert_eq!(route, "broken");
                assert_eq!(source.to_string(), "chunk 404");
            }
            other => panic!("expected LoadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_runtime_redirect_loop_detected() {
        // Guards bouncing between two routes are invisible to the static
        // cycle check; the runtime bound has to catch them.
        let router = Router::new(vec![
            Route::path("a")
                .guard(|_: &NavigationContext| -> GuardResult {
                    Ok(Verdict::Redirect("b/x".to_string()))
                })
                .children(vec![Route::path("x").view(view("ax"))]),
            Route::path("b")
                .guard(|_: &NavigationContext| -> GuardResult {
                    Ok(Verdict::Redirect("a/x".to_string()))
                })
                .children(vec![Route::path("x").view(view("bx"))]),
        ])
        .unwrap();

        let err = router.resolve("a/x", &mut ctx()).await.unwrap_err();
        assert!(matches!(
            err,
            NavigationError::RedirectLoop { ref path, limit } if path == "a/x" && limit == MAX_REDIRECT_DEPTH
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stale_navigation_is_superseded() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let slow = {
            let started = started.clone();
            let release = release.clone();
            loader(move || {
                let started = started.clone();
                let release = release.clone();
                async move {
                    started.notify_one();
                    release.notified().await;
                    Ok("slow")
                }
            })
        };

        let router = Arc::new(
            Router::new(vec![
                Route::path("slow").view(slow),
                Route::path("fast").view(view("fast")),
            ])
            .unwrap(),
        );

        let pending = {
            let router = router.clone();
            tokio::spawn(async move { router.resolve("slow", &mut ctx()).await })
        };
        started.notified().await;

        // A second navigation lands while the first is still loading.
        let fast = router.resolve("fast", &mut ctx()).await.unwrap();
        assert_eq!(fast.view, "fast");

        // The first load finishes afterwards; its view must never win.
        release.notify_one();
        let stale = pending.await.unwrap();
        assert!(matches!(stale, Err(NavigationError::Superseded)));
    }
}
