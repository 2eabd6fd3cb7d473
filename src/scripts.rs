// src/scripts.rs

//! Luau payloads embedded in the binary.
//!
//! Two pieces ship with the runner:
//! - the task script submitted to the Luau execution endpoint
//! - the runner module injected into the place tree before a Rojo build
//!
//! The task script only coordinates: it locates the injected runner module
//! inside the published place, runs it, and raises when suites fail, which
//! moves the remote task into the FAILED state. All test discovery lives in
//! the runner module so a place can also require it from Studio.

/// Filename the runner module is injected under. Rojo turns it into a
/// ModuleScript named `RbxexecRunner`, which is what the task script
/// searches for.
pub const RUNNER_MODULE_FILE: &str = "RbxexecRunner.luau";

/// Script submitted as the Luau execution task body.
///
/// Raises on failure so the task finishes FAILED rather than COMPLETE.
pub fn run_tests_script() -> &'static str {
    r#"
local runner = game:FindFirstChild("RbxexecRunner", true)
if runner == nil or not runner:IsA("ModuleScript") then
    error("RbxexecRunner module not found in the published place")
end

local report = require(runner).run(game)

print(string.format("Suites: %d passed, %d failed", report.passed, report.failed))

for _, failure in ipairs(report.failures) do
    warn(string.format("%s: %s", failure.name, failure.message))
end

if report.failed > 0 then
    error(string.format("%d test suite(s) failed", report.failed))
end
"#
}

/// Runner module injected into the place before building.
///
/// Discovers `*.spec` ModuleScripts anywhere under the given root, requires
/// each one, and treats a module that raises (or returns false) as a failed
/// suite. A spec module may export a function; it is called with no
/// arguments.
pub fn runner_module() -> &'static str {
    r#"
local Runner = {}

local function isSpec(instance)
    return instance:IsA("ModuleScript") and instance.Name:match("%.spec$") ~= nil
end

function Runner.run(root)
    local report = { passed = 0, failed = 0, failures = {} }

    for _, instance in ipairs(root:GetDescendants()) do
        if isSpec(instance) then
            local ok, result = pcall(require, instance)
            if ok and type(result) == "function" then
                ok, result = pcall(result)
            end

            if ok and result ~= false then
                report.passed += 1
            else
                report.failed += 1
                table.insert(report.failures, {
                    name = instance:GetFullName(),
                    message = ok and "spec returned false" or tostring(result),
                })
            end
        end
    end

    return report
end

return Runner
"#
}
