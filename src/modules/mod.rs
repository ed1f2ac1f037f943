pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
}

pub mod friend {
    pub mod schema;
    pub mod model;
    pub mod contact;
    pub mod permission;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod referral {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod notification {
    pub mod event;
    pub mod publisher;
}
