//! Static connect catalog.
//!
//! Frameworks, mobile SDKs and ORMs offered by the connect wizard, plus the
//! install commands of the client libraries they use.

use std::sync::LazyLock;

use common::models::connect::find_node;
use common::models::{ConnectTab, ConnectionType};

/// The three selection trees.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub frameworks: Vec<ConnectionType>,
    pub mobiles: Vec<ConnectionType>,
    pub orms: Vec<ConnectionType>,
}

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| Catalog {
    frameworks: frameworks(),
    mobiles: mobiles(),
    orms: orms(),
});

/// The built-in catalog.
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

impl Catalog {
    /// Tree behind `tab`; tabs without a tree have no nodes.
    pub fn tree(&self, tab: ConnectTab) -> &[ConnectionType] {
        match tab {
            ConnectTab::Frameworks => &self.frameworks,
            ConnectTab::Mobiles => &self.mobiles,
            ConnectTab::Orms => &self.orms,
            ConnectTab::Direct | ConnectTab::Mcp => &[],
        }
    }

    /// Frameworks followed by mobile SDKs, the trees a framework field can pick from.
    pub fn framework_trees(&self) -> impl Iterator<Item = &ConnectionType> {
        self.frameworks.iter().chain(self.mobiles.iter())
    }

    /// Finds a framework or mobile SDK by key.
    pub fn framework(&self, key: &str) -> Option<&ConnectionType> {
        find_node(&self.frameworks, key).or_else(|| find_node(&self.mobiles, key))
    }

    /// Install command for `library`, specialised for `parent` where needed.
    pub fn install_command(&self, parent: Option<&str>, library: &str) -> Option<&'static str> {
        let specialised = match (parent, library) {
            (Some("nextjs" | "sveltekit" | "remix" | "astro"), "supabasejs") => {
                Some("npm install @supabase/supabase-js @supabase/ssr")
            }
            (Some("prisma"), _) => Some("npm install prisma --save-dev"),
            (Some("drizzle"), _) => Some("npm install drizzle-orm postgres && npm install -D drizzle-kit"),
            _ => None,
        };
        specialised.or_else(|| library_install_command(library))
    }
}

fn library_install_command(library: &str) -> Option<&'static str> {
    match library {
        "supabasejs" => Some("npm install @supabase/supabase-js"),
        "supabasepy" => Some("pip install supabase"),
        "supabaseflutter" => Some("flutter pub add supabase_flutter"),
        "supabaseswift" => Some(
            "swift package add-dependency https://github.com/supabase/supabase-swift.git",
        ),
        "supabasekt" => Some("implementation(\"io.github.jan-tennert.supabase:postgrest-kt:3.0.0\")"),
        "prisma" => Some("npm install prisma --save-dev"),
        "drizzle" => Some("npm install drizzle-orm postgres && npm install -D drizzle-kit"),
        _ => None,
    }
}

fn supabasejs() -> ConnectionType {
    ConnectionType::leaf("supabasejs", "supabase-js", "supabase")
}

fn frameworks() -> Vec<ConnectionType> {
    let simple = |key: &str, label: &str, guide: &str| {
        ConnectionType::leaf(key, label, key)
            .with_guide(guide)
            .with_children(vec![supabasejs()])
    };

    vec![
        ConnectionType::leaf("nextjs", "Next.js", "nextjs")
            .with_guide("https://supabase.com/docs/guides/getting-started/quickstarts/nextjs")
            .with_children(vec![
                ConnectionType::leaf("app", "App Router", "").with_children(vec![supabasejs()]),
                ConnectionType::leaf("pages", "Pages Router", "").with_children(vec![supabasejs()]),
            ]),
        simple(
            "remix",
            "Remix",
            "https://supabase.com/docs/guides/auth/server-side/creating-a-client?framework=remix",
        ),
        ConnectionType::leaf("react", "React", "react")
            .with_guide("https://supabase.com/docs/guides/getting-started/quickstarts/reactjs")
            .with_children(vec![
                ConnectionType::leaf("create-react-app", "Create React App", "react")
                    .with_children(vec![supabasejs()]),
                ConnectionType::leaf("vite", "Vite", "vite").with_children(vec![supabasejs()]),
            ]),
        simple(
            "nuxt",
            "Nuxt",
            "https://supabase.com/docs/guides/getting-started/quickstarts/nuxtjs",
        ),
        simple(
            "vuejs",
            "Vue.JS",
            "https://supabase.com/docs/guides/getting-started/quickstarts/vue",
        ),
        simple(
            "sveltekit",
            "SvelteKit",
            "https://supabase.com/docs/guides/getting-started/quickstarts/sveltekit",
        ),
        simple(
            "solidjs",
            "Solid.js",
            "https://supabase.com/docs/guides/getting-started/quickstarts/solidjs",
        ),
        simple(
            "astro",
            "Astro",
            "https://supabase.com/partners/integrations/astro",
        ),
        simple(
            "refine",
            "refine",
            "https://supabase.com/docs/guides/getting-started/quickstarts/refine",
        ),
    ]
}

fn mobiles() -> Vec<ConnectionType> {
    let sdk = |key: &str, label: &str, guide: &str, library: ConnectionType| {
        ConnectionType::leaf(key, label, key)
            .with_guide(guide)
            .with_children(vec![library])
    };

    vec![
        sdk(
            "exporeactnative",
            "Expo React Native",
            "https://supabase.com/docs/guides/getting-started/tutorials/with-expo-react-native",
            supabasejs(),
        ),
        sdk(
            "flutter",
            "Flutter",
            "https://supabase.com/docs/guides/getting-started/tutorials/with-flutter",
            ConnectionType::leaf("supabaseflutter", "supabase-flutter", "supabase"),
        ),
        sdk(
            "ionicreact",
            "Ionic React",
            "https://supabase.com/docs/guides/getting-started/tutorials/with-ionic-react",
            supabasejs(),
        ),
        sdk(
            "swift",
            "Swift",
            "https://supabase.com/docs/guides/getting-started/tutorials/with-swift",
            ConnectionType::leaf("supabaseswift", "supabase-swift", "supabase"),
        ),
        sdk(
            "androidkotlin",
            "Android Kotlin",
            "https://supabase.com/docs/guides/getting-started/tutorials/with-kotlin",
            ConnectionType::leaf("supabasekt", "supabase-kt", "supabase"),
        ),
        sdk(
            "ionicangular",
            "Ionic Angular",
            "https://supabase.com/docs/guides/getting-started/tutorials/with-ionic-angular",
            supabasejs(),
        ),
    ]
}

fn orms() -> Vec<ConnectionType> {
    vec![
        ConnectionType::leaf("prisma", "Prisma", "prisma")
            .with_guide("https://supabase.com/partners/integrations/prisma"),
        ConnectionType::leaf("drizzle", "Drizzle", "drizzle")
            .with_guide("https://supabase.com/docs/guides/database/connecting-to-postgres#connecting-with-drizzle"),
    ]
}
