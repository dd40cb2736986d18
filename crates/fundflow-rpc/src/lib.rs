//! fundflow-rpc
//!
//! JSON-RPC 2.0 server for the lifecycle engine. Every call acts as the
//! session user the server was started for.
//!
//! Namespace: "fundflow"
//! Methods:
//!   fundflow_listFeed / getPost / fundPost / toggleLike   — community feed
//!   fundflow_listProjects / getProject / saveProject      — owned projects
//!   fundflow_addStage / removeStage / updateStage         — stage editing
//!   fundflow_startStage                                   — pending → in-progress
//!   fundflow_requestStageCompletion / confirmStageCompletion /
//!     cancelStageCompletion                               — two-step completion
//!   fundflow_submitProposal / submitStatusPost /
//!     updateProjectNote                                   — new projects and updates
//!   fundflow_getCollection / evolveCompanion / pullGacha /
//!     recordActivity                                      — badges and companions
//!   fundflow_getProfile                                   — session user summary

pub mod api;
pub mod server;
pub mod types;

pub use server::RpcServer;
pub use server::RpcServerState;
pub use types::{
    RpcCollection, RpcContribution, RpcFeedPost, RpcPendingCompletion, RpcProfile, RpcProject,
    RpcStatusPost,
};
